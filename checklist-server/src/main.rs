//! Checklist state server.
//!
//! Serves the State API over a single JSON document on disk.
//!
//! # Usage
//!
//! ```bash
//! # Run on the default address 0.0.0.0:3000 with ./state.json
//! cargo run --bin checklist-server
//!
//! # Custom port and data file
//! cargo run --bin checklist-server -- --port 8080 --data-file /tmp/state.json
//!
//! # Or via environment variables
//! PORT=8080 CHECKLIST_DATA_FILE=/tmp/state.json cargo run --bin checklist-server
//! ```

use std::sync::Arc;

use checklist_server::api::{self, AppState};
use checklist_server::config::{ServerCliArgs, ServerConfig};
use checklist_server::store::StateStore;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr(),
        data_file = %config.data_file.display(),
        "starting checklist state server"
    );

    let state = Arc::new(AppState::new(StateStore::new(config.data_file.clone())));

    match api::start_server(&config.bind_addr(), state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "server running on http://{bound_addr}");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "state server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start state server");
            std::process::exit(1);
        }
    }
}
