use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

mod app;
mod cli;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting overlay-themer");

    let args = cli::Args::parse();

    let config = match &args.config {
        Some(path) => overlay_themer::config::load_from(path)?,
        None => overlay_themer::config::load()?,
    };

    let mut app = App::new(config, &args)?;
    app.run(&args.command)
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = overlay_themer::config::data_dir().join("logs");
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "overlay-themer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
