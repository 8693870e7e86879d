use analysis_core::{AnalysisError, FundamentalsSnapshot, MarketDataProvider, NewsProvider, Period, PriceBar, PriceSeries};
use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// On-disk snapshot of everything the providers would return for one ticker
#[derive(Debug, Deserialize)]
pub struct TickerFixture {
    #[serde(default)]
    pub bars: Vec<PriceBar>,
    #[serde(default)]
    pub fundamentals: FundamentalsSnapshot,
    /// Missing or `null` simulates a news outage
    #[serde(default)]
    pub headlines: Option<Vec<String>>,
}

/// Offline provider reading `DIR/<TICKER>.json`
pub struct FixtureProvider {
    dir: PathBuf,
}

fn lookback_days(period: Period) -> Option<i64> {
    match period {
        Period::OneMonth => Some(31),
        Period::ThreeMonths => Some(92),
        Period::SixMonths => Some(183),
        Period::OneYear => Some(366),
        Period::TwoYears => Some(731),
        Period::FiveYears => Some(1827),
        Period::Max => None,
    }
}

impl FixtureProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    async fn load(&self, symbol: &str) -> Result<TickerFixture, AnalysisError> {
        let path = self.dir.join(format!("{}.json", symbol.to_uppercase()));
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AnalysisError::Upstream(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&body).map_err(|e| AnalysisError::Upstream(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl MarketDataProvider for FixtureProvider {
    /// Bars within the period, counted back from the newest bar in the file
    async fn price_history(&self, symbol: &str, period: Period) -> Result<PriceSeries, AnalysisError> {
        let series = PriceSeries::new(self.load(symbol).await?.bars)?;

        let (Some(days), Some(last)) = (lookback_days(period), series.last_timestamp()) else {
            return Ok(series);
        };
        let cutoff = last - Duration::days(days);
        PriceSeries::new(
            series
                .bars()
                .iter()
                .filter(|b| b.timestamp > cutoff)
                .cloned()
                .collect(),
        )
    }

    async fn fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, AnalysisError> {
        Ok(self.load(symbol).await?.fundamentals)
    }
}

#[async_trait]
impl NewsProvider for FixtureProvider {
    async fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<String>, AnalysisError> {
        match self.load(symbol).await?.headlines {
            Some(titles) => Ok(titles.into_iter().take(limit).collect()),
            None => Err(AnalysisError::Upstream(format!("{}: no news in fixture", symbol))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(dir: &Path, symbol: &str, body: &str) {
        std::fs::write(dir.join(format!("{}.json", symbol)), body).unwrap();
    }

    const FIXTURE: &str = r#"{
        "bars": [
            {"timestamp": "2024-03-01T00:00:00Z", "open": 10, "high": 11, "low": 9, "close": 10.5},
            {"timestamp": "2024-01-01T00:00:00Z", "open": 9, "high": 10, "low": 8, "close": 9.5, "volume": 1000},
            {"timestamp": "2024-02-15T00:00:00Z", "open": 10, "high": 10, "low": 10, "close": 10}
        ],
        "fundamentals": {"profitMargins": 0.2, "trailingPE": 18.5, "longName": "Fixture Inc"},
        "headlines": ["One", "Two", "Three"]
    }"#;

    #[tokio::test]
    async fn test_reads_fixture_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "FIX", FIXTURE);
        let provider = FixtureProvider::new(dir.path());

        let series = provider.price_history("fix", Period::Max).await.unwrap();
        assert_eq!(series.closes(), vec![9.5, 10.0, 10.5]);

        let f = provider.fundamentals("FIX").await.unwrap();
        assert_eq!(f.profit_margin, Some(0.2));
        assert_eq!(f.trailing_pe, Some(18.5));
        assert_eq!(f.long_name.as_deref(), Some("Fixture Inc"));

        assert_eq!(provider.headlines("FIX", 2).await.unwrap(), vec!["One", "Two"]);
    }

    #[tokio::test]
    async fn test_period_trims_old_bars() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "FIX", FIXTURE);
        let provider = FixtureProvider::new(dir.path());

        let series = provider.price_history("FIX", Period::OneMonth).await.unwrap();
        assert_eq!(series.closes(), vec![10.0, 10.5]);
    }

    #[tokio::test]
    async fn test_missing_file_is_upstream() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FixtureProvider::new(dir.path());
        let err = provider.price_history("NONE", Period::OneYear).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_null_headlines_is_news_outage() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "QUIET", r#"{"bars": [], "headlines": null}"#);
        let provider = FixtureProvider::new(dir.path());
        assert!(provider.headlines("QUIET", 5).await.is_err());
        assert!(provider.price_history("QUIET", Period::OneYear).await.unwrap().is_empty());
    }
}
