//! Impostor game server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin impostor-server
//! cargo run --bin impostor-server -- --host 0.0.0.0 --port 3000 --quota 4
//! RUST_LOG=debug cargo run --bin impostor-server -- --characters pool.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use impostor::prelude::*;
use impostor::load_characters;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "impostor=info,impostor_room=info,impostor_transport=info";

#[derive(Parser, Debug)]
#[command(name = "impostor-server")]
#[command(about = "WebSocket server for the Impostor party game", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Players needed to deal a round (also the room capacity)
    #[arg(short = 'q', long, default_value = "2")]
    quota: usize,

    /// JSON file holding an array of character names
    #[arg(short = 'c', long)]
    characters: Option<PathBuf>,

    /// Seed for room ids and draws, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut room_config = RoomConfig {
        quota: args.quota,
        ..RoomConfig::default()
    };
    if let Some(path) = &args.characters {
        room_config.characters = load_characters(path)?;
    }

    let mut builder = ImpostorServer::builder()
        .bind(&format!("{}:{}", args.host, args.port))
        .room_config(room_config);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }

    let server = builder.build().await?;
    tracing::info!(addr = %server.local_addr()?, quota = args.quota, "listening");

    server.run().await?;
    Ok(())
}
