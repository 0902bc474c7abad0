pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod kvstore;
pub mod render;
pub mod store;
pub mod sync;
pub mod task;
pub mod views;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

pub use error::{Error, Result};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting deck CLI");

    let cfg = config::Config::load(cli.deckrc.as_deref())?;

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let kv: Box<dyn kvstore::KvStore> = match kvstore::FileKvStore::open(&data_dir) {
        Ok(kv) => Box::new(kv),
        Err(err) => {
            let err = Error::PersistenceUnavailable(err.to_string());
            warn!(error = %err, "running without durable storage");
            Box::new(kvstore::MemoryKvStore::new())
        }
    };

    let remote = sync::CommandSync::from_config(&cfg);
    let mut store = store::TaskStore::open(kv)
        .with_context(|| format!("failed to open task store at {}", data_dir.display()))?;
    if let Some(remote) = remote.clone() {
        store = store.with_remote(Box::new(remote));
    }

    let mut renderer = render::Renderer::new(&cfg)?;

    commands::dispatch(
        &mut store,
        remote.as_ref().map(|sink| sink as &dyn sync::RemoteSync),
        &mut renderer,
        cli.command,
    )?;

    info!("done");
    Ok(())
}
