//! Test fixtures shared by the integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tagarela_server::{
    ServerConfig,
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::{serve, state::AppState},
};
use tokio::{net::TcpStream, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Server running on an ephemeral port for the duration of a test
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let state = Arc::new(AppState::in_memory(&ServerConfig::default()));
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(e) = serve(listener, state, shutdown).await {
                eprintln!("test server stopped: {e}");
            }
        });

        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Register an account through the HTTP API
    pub async fn register(&self, username: &str, password: &str) {
        let response = reqwest::Client::new()
            .post(format!("{}/api/register", self.base_url()))
            .json(&serde_json::json!({"username": username, "password": password}))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }

    pub async fn connect(&self) -> WsClient {
        let (ws, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect WebSocket");
        ws
    }

    /// Register, connect and authenticate; returns the socket with the
    /// authentication events already consumed.
    pub async fn login(&self, username: &str) -> WsClient {
        self.register(username, "segredo123").await;
        let mut ws = self.connect().await;
        send(&mut ws, &ClientEvent::Authenticate(username.to_string())).await;
        recv_until(&mut ws, |e| {
            *e == ServerEvent::UserConnected(username.to_string())
        })
        .await;
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn send(ws: &mut WsClient, event: &ClientEvent) {
    let json = serde_json::to_string(event).expect("Failed to serialize event");
    ws.send(Message::Text(json.into()))
        .await
        .expect("Failed to send frame");
}

pub async fn send_raw(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next server event, failing the test after five seconds
pub async fn recv(ws: &mut WsClient) -> ServerEvent {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Socket closed")
            .expect("WebSocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("Failed to parse event");
        }
    }
}

/// Skip events until one matches `predicate`
pub async fn recv_until<F>(ws: &mut WsClient, predicate: F) -> ServerEvent
where
    F: Fn(&ServerEvent) -> bool,
{
    loop {
        let event = recv(ws).await;
        if predicate(&event) {
            return event;
        }
    }
}
