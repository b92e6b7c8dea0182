//! Realtime duel session server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin duelhub-server
//! cargo run --bin duelhub-server -- --host 0.0.0.0 --port 3000 --data-dir ./data
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use duelhub_server::{
    infrastructure::{
        codec::CodecKind,
        hub::HubConfig,
        repository::{JsonResultRepository, JsonRoomRepository, JsonUserRepository},
    },
    ui::{Server, state::AppState},
};
use duelhub_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "duelhub-server")]
#[command(about = "Realtime duel session server over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Directory holding users.json, rooms.json and game_results.json
    #[arg(short = 'd', long, default_value = "data")]
    data_dir: PathBuf,

    /// Seconds without a heartbeat before a connection is dropped
    #[arg(long, default_value = "10")]
    heartbeat_timeout_secs: u64,

    /// Outbound messages buffered per connection before it is dropped
    #[arg(long, default_value = "256")]
    mailbox_capacity: usize,

    /// WebSocket frame codec (plain | base64)
    #[arg(long, default_value_t = CodecKind::Plain)]
    codec: CodecKind,
}

impl Args {
    fn hub_config(&self) -> HubConfig {
        HubConfig {
            mailbox_capacity: self.mailbox_capacity,
            heartbeat_timeout: Duration::from_secs(self.heartbeat_timeout_secs),
            ..HubConfig::default()
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. AppState (UseCases + Hub)
    // 3. Session reset and heartbeat sweep
    // 4. Server

    // 1. Open the JSON stores
    let (users, rooms, results) = match tokio::try_join!(
        JsonUserRepository::open(&args.data_dir),
        JsonRoomRepository::open(&args.data_dir),
        JsonResultRepository::open(&args.data_dir),
    ) {
        Ok(stores) => stores,
        Err(e) => {
            tracing::error!("Failed to open data directory {:?}: {}", args.data_dir, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Using data directory {:?}", args.data_dir);

    // 2. Wire use cases and the hub
    let state = Arc::new(AppState::new(
        Arc::new(users),
        Arc::new(rooms),
        Arc::new(results),
        Arc::new(SystemClock),
        args.hub_config(),
        args.codec.build(),
    ));
    tracing::info!("Frame codec: {}", args.codec);

    // 3. Nobody is connected yet: drop rooms and online flags left by the last run
    if let Err(e) = state.reset_sessions_usecase.execute().await {
        tracing::error!("Failed to reset sessions: {}", e);
        std::process::exit(1);
    }
    let _sweep = state.hub.spawn_heartbeat_sweep();

    // 4. Run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
