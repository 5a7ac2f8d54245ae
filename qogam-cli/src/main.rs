//! `qogam`: developer CLI for the Qogam client core.
//!
//! Drives the same session controller the mobile app uses, persisting the session in a JSON file
//! instead of device storage:
//!
//! ```text
//! qogam request-code --phone "+7 700 123 45 67"
//! qogam confirm --code 1234
//! qogam courses
//! ```

mod cli;
mod commands;
mod file_store;

use std::sync::Arc;

use clap::Parser;
use qogam_core::{session::SessionController, store::KeyValueStore};
use tracing_subscriber::EnvFilter;

use crate::{cli::Cli, file_store::FileKeyValueStore};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.client_config()?;
    let store = Arc::new(FileKeyValueStore::open(cli.session_file()?)?);
    tracing::debug!(path = %store.path().display(), base_url = %config.base_url, "starting");

    let controller =
        SessionController::new(config, Arc::clone(&store) as Arc<dyn KeyValueStore>)?;
    commands::run(cli.command, &controller, store.as_ref()).await
}
