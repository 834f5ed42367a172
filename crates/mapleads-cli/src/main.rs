use std::future::Future;
use std::process::ExitCode;

use clap::Parser;
use mapleads_core::SearchQuery;
use mapleads_export::CsvSink;
use mapleads_scraper::{
    ChromiumSession, ExtractionPipeline, PipelineSettings, RunSummary, ScraperError,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mapleads")]
#[command(about = "Collect dentist leads for a city from map search results")]
struct Cli {
    /// City to search in, e.g. "Istanbul".
    #[arg(long, default_value = "Istanbul")]
    city: String,
}

enum RunOutcome {
    Completed(RunSummary),
    SearchFailed,
    Interrupted,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli.city).await {
        Ok(RunOutcome::Completed(summary)) => {
            println!("Scraped {} rows.", summary.written);
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::SearchFailed) => {
            println!("Search failed after retry. Exiting.");
            ExitCode::FAILURE
        }
        Ok(RunOutcome::Interrupted) => {
            println!("Interrupted by user.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(city: &str) -> anyhow::Result<RunOutcome> {
    let config = mapleads_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let selectors = mapleads_core::load_selector_config(config.selectors_path.as_deref())?;
    let settings = PipelineSettings::from_app_config(&config);
    let query = SearchQuery::new(city);
    let mut sink = CsvSink::new(&config.output_path);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let Some(session) =
        until_interrupted(ChromiumSession::launch(&config.browser), &mut shutdown).await
    else {
        return Ok(RunOutcome::Interrupted);
    };
    let session = session?;

    let result = {
        let pipeline = ExtractionPipeline::new(session.page(), &selectors, &settings);
        until_interrupted(pipeline.run(&query, &mut sink), &mut shutdown).await
    };

    session.close().await;

    match result {
        None => Ok(RunOutcome::Interrupted),
        Some(Ok(summary)) => Ok(RunOutcome::Completed(summary)),
        Some(Err(ScraperError::SearchFailed { query, attempts })) => {
            tracing::error!(%query, attempts, "search did not reach the result feed");
            Ok(RunOutcome::SearchFailed)
        }
        Some(Err(err)) => Err(err.into()),
    }
}

/// Awaits `work` unless `shutdown` completes first.
async fn until_interrupted<F, S>(work: F, shutdown: &mut S) -> Option<F::Output>
where
    F: Future,
    S: Future<Output = ()> + Unpin,
{
    tokio::select! {
        output = work => Some(output),
        () = shutdown => None,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, closing browser");
}
