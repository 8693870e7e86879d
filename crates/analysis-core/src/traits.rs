use async_trait::async_trait;
use crate::{AnalysisError, FundamentalsSnapshot, Period, PriceSeries};

/// Source of price history and fundamentals for a ticker
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn price_history(&self, symbol: &str, period: Period) -> Result<PriceSeries, AnalysisError>;

    async fn fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, AnalysisError>;
}

/// Source of raw headline titles for a ticker
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<String>, AnalysisError>;
}
