//! prime-terminal: fetch, score and print a ticker report or a side-by-side comparison.
//!
//! Usage:
//!   cargo run -p prime-terminal -- analyze NVDA
//!   cargo run -p prime-terminal -- analyze AAPL --period 6mo --json
//!   cargo run -p prime-terminal -- compare AAPL MSFT GOOGL
//!   cargo run -p prime-terminal -- compare DEMO QUIET --fixtures crates/prime-terminal/fixtures

mod cli;
mod fixtures;

use analysis_core::EngineConfig;
use analysis_orchestrator::presentation::{render_comparison, render_text_report};
use analysis_orchestrator::{AnalysisOrchestrator, AppState};
use anyhow::{bail, Context};
use cli::{CliArgs, Command};
use fixtures::FixtureProvider;
use yahoo_client::YahooClient;

/// Comma-separated favorites used when `compare` is given no tickers
fn favorites_from_env(value: Option<String>) -> AppState {
    let mut state = AppState::new();
    for ticker in value.unwrap_or_default().split(',') {
        state.add_favorite(ticker, None);
    }
    state
}

/// Execute one command and return what should be printed
async fn run(cli: &CliArgs, orchestrator: &AnalysisOrchestrator, state: &mut AppState) -> anyhow::Result<String> {
    match &cli.command {
        Command::Analyze { ticker } => {
            if !state.set_active(ticker) {
                bail!("ticker must not be blank");
            }
            let symbol = state.active_ticker().to_string();

            let report = orchestrator
                .analyze(&symbol, cli.period)
                .await
                .with_context(|| format!("could not analyze {}", symbol))?;

            if cli.json {
                serde_json::to_string_pretty(&report).context("serializing report")
            } else {
                Ok(render_text_report(&report, cli.decorated))
            }
        }
        Command::Compare { tickers } => {
            let tickers: Vec<String> = if tickers.is_empty() {
                state.favorites().to_vec()
            } else {
                tickers.clone()
            };
            if tickers.is_empty() {
                bail!("compare needs tickers (or PRIME_FAVORITES)");
            }

            let result = orchestrator.compare(&tickers, cli.period).await;
            if result.rows.iter().all(|r| r.report().is_none()) {
                bail!("every ticker failed:\n{}", render_comparison(&result, false));
            }

            if cli.json {
                serde_json::to_string_pretty(&result).context("serializing comparison")
            } else {
                Ok(render_comparison(&result, cli.decorated))
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prime_terminal=info,analysis_orchestrator=info,yahoo_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", cli::USAGE);
        return Ok(());
    }
    let cli = match cli::parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}\n\n{}", e, cli::USAGE);
            std::process::exit(2);
        }
    };

    let config = EngineConfig::from_env();
    let orchestrator = match &cli.fixtures {
        Some(dir) => {
            tracing::info!("Reading fixtures from {}", dir.display());
            AnalysisOrchestrator::with_cached_provider(FixtureProvider::new(dir), config)
        }
        None => AnalysisOrchestrator::with_cached_provider(YahooClient::new(), config),
    };

    let mut state = favorites_from_env(std::env::var("PRIME_FAVORITES").ok());
    let output = run(&cli, &orchestrator, &mut state).await?;
    println!("{}", output);
    Ok(())
}
