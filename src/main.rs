#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod accumulator;
mod bus;
mod cli;
mod logging;
mod monitor;
mod prelude;
mod quantity;
mod sentinel;
mod storage;

use std::sync::{Arc, atomic::AtomicBool};

use clap::{Parser, crate_version};
use signal_hook::consts::{SIGINT, SIGTERM};

use crate::{cli::Args, monitor::Monitor, prelude::*};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    logging::init(args.log_file.as_deref())?;
    info!(version = crate_version!(), "starting…");

    let io_timeout = *args.storage.io_timeout;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the runtime")?;
    let result = runtime.block_on(run(args));

    // Do not hang on a filesystem call that has already timed out.
    runtime.shutdown_timeout(io_timeout);

    if let Err(error) = &result {
        error!("{error:#}");
    }
    result
}

async fn run(args: Args) -> Result {
    args.sampling.validate()?;
    let sentinel = args.storage.sentinel()?;
    info!(path = %sentinel.path().display(), "create the sentinel file to stop");
    if sentinel.is_requested() {
        warn!("the sentinel file already exists, the monitor will stop after the first tick");
    }

    let termination = Arc::new(AtomicBool::new(false));
    for signal in [SIGTERM, SIGINT] {
        signal_hook::flag::register(signal, Arc::clone(&termination))
            .with_context(|| format!("failed to register the handler for signal #{signal}"))?;
    }

    let shutdown = Monitor::builder()
        .bus(args.bus.connect()?)
        .paths(args.bus.paths())
        .store(args.storage.store())
        .sentinel(sentinel)
        .termination(termination)
        .energy_unit(args.sampling.energy_unit)
        .sample_interval(args.sampling.sample_interval)
        .checkpoint_interval(args.sampling.checkpoint_interval)
        .max_integration_gap(args.sampling.max_integration_gap)
        .bus_timeout(args.bus.timeout)
        .io_timeout(args.storage.io_timeout)
        .build()
        .run()
        .await?;

    info!(?shutdown, "done!");
    Ok(())
}
