use crate::{AnalysisOrchestrator, TickerInputs, TickerReport};
use analysis_core::{AnalysisError, Period};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonRow {
    Report(Box<TickerReport>),
    Failed {
        symbol: String,
        error: String,
        /// Provider error or fetch timeout rather than unusable data
        upstream: bool,
    },
}

impl ComparisonRow {
    pub fn symbol(&self) -> &str {
        match self {
            ComparisonRow::Report(report) => &report.symbol,
            ComparisonRow::Failed { symbol, .. } => symbol,
        }
    }

    pub fn report(&self) -> Option<&TickerReport> {
        match self {
            ComparisonRow::Report(report) => Some(report),
            ComparisonRow::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub period: Period,
    pub generated_at: DateTime<Utc>,
    /// One row per requested ticker, in request order
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonResult {
    /// Successful reports, best score first; equal scores by higher Sharpe
    pub fn ranked(&self) -> Vec<&TickerReport> {
        let mut reports: Vec<&TickerReport> = self.rows.iter().filter_map(ComparisonRow::report).collect();
        reports.sort_by(|a, b| {
            b.score
                .score
                .cmp(&a.score.score)
                .then_with(|| b.risk.sharpe.partial_cmp(&a.risk.sharpe).unwrap_or(Ordering::Equal))
        });
        reports
    }

    pub fn failures(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|r| matches!(r, ComparisonRow::Failed { .. }))
    }
}

/// Upper-case, drop blanks and repeated tickers, keep first-seen order
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut seen = Vec::new();
    for symbol in symbols {
        let symbol = symbol.as_ref().trim().to_uppercase();
        if !symbol.is_empty() && !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    seen
}

impl AnalysisOrchestrator {
    /// Analyze several tickers side by side.
    ///
    /// Fetches run concurrently under one shared deadline; a ticker that misses it gets a
    /// timeout row. Evaluation of the fetched inputs runs in parallel.
    pub async fn compare<S: AsRef<str>>(&self, symbols: &[S], period: Period) -> ComparisonResult {
        let symbols = normalize_symbols(symbols);
        let timeout = Duration::from_secs(self.config().compare_timeout_secs);
        let deadline = Instant::now() + timeout;

        tracing::info!("Comparing {} tickers (timeout {:?})", symbols.len(), timeout);

        let fetches = symbols.iter().map(|symbol| async move {
            match timeout_at(deadline, self.fetch_inputs(symbol, period)).await {
                Ok(result) => result,
                Err(_) => Err(AnalysisError::Timeout(format!(
                    "{} not fetched within {}s",
                    symbol,
                    timeout.as_secs()
                ))),
            }
        });
        let fetched: Vec<Result<TickerInputs, AnalysisError>> = join_all(fetches).await;

        let rows: Vec<ComparisonRow> = fetched
            .par_iter()
            .zip(symbols.par_iter())
            .map(|(result, symbol)| match result {
                Ok(inputs) => ComparisonRow::Report(Box::new(self.evaluate(inputs))),
                Err(e) => ComparisonRow::Failed {
                    symbol: symbol.clone(),
                    error: e.to_string(),
                    upstream: e.is_upstream(),
                },
            })
            .collect();

        let failed = rows.iter().filter(|r| r.report().is_none()).count();
        if failed > 0 {
            tracing::warn!("{} of {} tickers failed", failed, rows.len());
        }

        ComparisonResult {
            period,
            generated_at: Utc::now(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use analysis_core::{EngineConfig, FundamentalsSnapshot};
    use std::sync::Arc;

    fn two_ticker_provider() -> MockProvider {
        MockProvider::default()
            .with_ticker("GOOD", &rising_closes(260), quality_fundamentals(), &["Shares rally"])
            .with_ticker("MEH", &rising_closes(260), FundamentalsSnapshot::default(), &[])
    }

    #[test]
    fn test_normalize_symbols() {
        assert_eq!(
            normalize_symbols(&["aapl", " MSFT ", "AAPL", "", "nvda"]),
            vec!["AAPL", "MSFT", "NVDA"]
        );
    }

    #[tokio::test]
    async fn test_rows_keep_request_order_and_isolate_failures() {
        let result = orchestrator(two_ticker_provider())
            .compare(&["meh", "MISSING", "good"], Period::OneYear)
            .await;

        let symbols: Vec<&str> = result.rows.iter().map(ComparisonRow::symbol).collect();
        assert_eq!(symbols, vec!["MEH", "MISSING", "GOOD"]);

        match &result.rows[1] {
            ComparisonRow::Failed { upstream, .. } => assert!(*upstream),
            other => panic!("expected a failure row, got {:?}", other),
        }
        assert_eq!(result.failures().count(), 1);
    }

    #[tokio::test]
    async fn test_ranked_by_score() {
        let result = orchestrator(two_ticker_provider())
            .compare(&["MEH", "GOOD"], Period::OneYear)
            .await;

        let ranked: Vec<&str> = result.ranked().iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(ranked, vec!["GOOD", "MEH"]);
    }

    #[tokio::test]
    async fn test_duplicates_fetched_once() {
        let result = orchestrator(two_ticker_provider())
            .compare(&["good", "GOOD"], Period::OneYear)
            .await;
        assert_eq!(result.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_slow_ticker_times_out() {
        let mut provider = two_ticker_provider();
        provider.delay_ms.insert("MEH".to_string(), 3_000);
        let provider = Arc::new(provider);
        let config = EngineConfig {
            compare_timeout_secs: 1,
            ..Default::default()
        };
        let orch = AnalysisOrchestrator::new(provider.clone(), provider, config);

        let result = orch.compare(&["GOOD", "MEH"], Period::OneYear).await;
        assert!(result.rows[0].report().is_some());
        match &result.rows[1] {
            ComparisonRow::Failed { upstream, error, .. } => {
                assert!(*upstream);
                assert!(error.starts_with("Timed out"));
                assert!(error.contains("MEH"));
            }
            other => panic!("expected a timeout row, got {:?}", other),
        }
    }
}
