use std::{path::Path, process::ExitCode};

use clap::Parser;
use excel_sheets_sync::prettyprint::prettyprint::PrettyFormatter;
use indicatif::ProgressStyle;
use tracing::{info, instrument};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod cli_adapter;

use cli_adapter::{Cli, CliAdapter};

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = setup_tracing(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Failed to set up logging: {}", error);
        return ExitCode::FAILURE;
    }
    setup_panic_hook();

    info!("Starting excel-sheets-sync");

    let cli_adapter = CliAdapter::new(cli);
    if cli_adapter.run().await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn setup_tracing(verbose: bool, log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    let indicatif_layer = IndicatifLayer::new().with_progress_style(
        ProgressStyle::with_template("{spinner:.green} {span_name}{{{span_fields}}} {wide_msg}")?,
    );

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true, verbose))
        .with_writer(indicatif_layer.get_stderr_writer());

    let log_file_layer = match log_file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(false, true))
                .with_writer(std::fs::File::create(path)?)
                .with_ansi(false),
        ),
        None => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("excel_sheets_sync", level),
        )
        .with(indicatif_layer)
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}
