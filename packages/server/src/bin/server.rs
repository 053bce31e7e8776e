//! Tagarela chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tagarela-server -- --port 3000
//! ```

use clap::Parser;
use tagarela_server::ServerConfig;
use tagarela_shared::logger::setup_logger;

/// Room-based chat server
#[derive(Parser, Debug)]
#[command(name = "tagarela-server")]
#[command(version, about)]
struct ServerArgs {
    /// Interface to bind
    #[arg(long, env = "TAGARELA_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Number of messages sent to a connection when it joins a room
    #[arg(long, env = "TAGARELA_HISTORY_LIMIT", default_value_t = 50)]
    history_limit: usize,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        history_limit: args.history_limit,
    };

    if let Err(e) = tagarela_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
