#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod error;
mod prelude;
mod quantity;
mod render;
mod run;
mod settings;
mod store;
mod tables;

use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, crate_version};

use crate::{
    api::Fronius,
    cli::Args,
    error::RunError,
    prelude::*,
    run::run,
    settings::Settings,
    store::Store,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    match try_main(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.is_fatal() => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
        Err(error) => {
            warn!("skipping the run: {error:#}");
            ExitCode::SUCCESS
        }
    }
}

async fn try_main(args: Args) -> Result<(), RunError> {
    let settings = args.into_settings().map_err(RunError::Configuration)?;
    if settings.test_mode {
        warn!(path = %settings.paths.archive.display(), "test mode");
    }
    if let Some(mode) = settings.mode_override {
        info!(?mode, "forced mode");
    }
    let store = Store::open(&settings.paths).map_err(RunError::Configuration)?;
    let source = build_source(&settings).map_err(RunError::Configuration)?;
    let outcome = run(&settings, &store, &source, Local::now()).await?;
    info!(?outcome, "done");
    Ok(())
}

fn build_source(settings: &Settings) -> Result<Fronius> {
    Fronius::try_new(&settings.inverter, settings.labels.strings.len())
}
