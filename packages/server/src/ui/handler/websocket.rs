//! WebSocket connection handlers.
//!
//! One task reads client frames and processes them one at a time, so a
//! connection's own events are never reordered. A second task forwards the
//! connection's outbound channel to the socket. When the outbound side ends
//! first, the reader is asked to stop and only does so between frames, so
//! an event already being handled (including its persistence) completes.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{Stream, StreamExt},
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{ConnectionId, ConnectionIdFactory},
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::state::AppState,
    usecase::{OUTBOUND_QUEUE_CAPACITY, SendMessageUseCase, SessionError},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(OUTBOUND_QUEUE_CAPACITY);
    state.sessions.connect(connection_id, tx).await;

    let (mut sender, receiver) = socket.split();

    // Forward queued events to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let (stop_tx, stop_rx) = oneshot::channel();
    let mut recv_task = tokio::spawn(receive_frames(
        receiver,
        stop_rx,
        state.clone(),
        connection_id,
    ));

    let outbound_closed = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => true,
    };
    if outbound_closed {
        let _ = stop_tx.send(());
        if let Err(e) = recv_task.await {
            tracing::error!("Reader of '{}' failed: {}", connection_id, e);
        }
    } else {
        send_task.abort();
    }

    state.sessions.disconnect(connection_id).await;
}

/// Handle client frames until the stream ends or `stop` fires.
///
/// `stop` is only observed between frames.
async fn receive_frames<S>(
    mut frames: S,
    mut stop: oneshot::Receiver<()>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            _ = &mut stop => break,
            msg = frames.next() => msg,
        };
        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received from '{}': {}", connection_id, text.as_str());
                handle_text(&state, connection_id, text.as_str()).await;
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection_id);
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => {}
        }
    }
}

async fn handle_text(state: &AppState, connection_id: ConnectionId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Malformed event from '{}': {}", connection_id, e);
            state
                .sessions
                .notify(
                    connection_id,
                    ServerEvent::RoomError(format!("Malformed event: {e}")),
                )
                .await;
            return;
        }
    };

    if let Err(e) = dispatch(state, connection_id, event).await {
        tracing::warn!("Rejected event from '{}': {}", connection_id, e);
        state.sessions.notify(connection_id, e.to_event()).await;
    }
}

async fn dispatch(
    state: &AppState,
    connection_id: ConnectionId,
    event: ClientEvent,
) -> Result<(), SessionError> {
    let sessions = &state.sessions;
    match event {
        ClientEvent::Authenticate(username) => {
            sessions.authenticate(connection_id, &username).await
        }
        ClientEvent::SendMessage(payload) => {
            SendMessageUseCase::new(sessions.clone(), state.messages.clone())
                .send_text(connection_id, &payload.text, payload.room.as_deref())
                .await
                .map(|_| ())
        }
        ClientEvent::SendAudio(payload) => {
            SendMessageUseCase::new(sessions.clone(), state.messages.clone())
                .send_audio(connection_id, payload.audio, payload.room.as_deref())
                .await
                .map(|_| ())
        }
        ClientEvent::CreateRoom(name) => sessions.create(connection_id, &name).await.map(|_| ()),
        ClientEvent::JoinRoom(name) => sessions.join(connection_id, &name).await.map(|_| ()),
        ClientEvent::RequestActiveRooms => {
            sessions.refresh_room_list().await;
            Ok(())
        }
    }
}
