use analysis_core::{
    AnalysisError, EngineConfig, FundamentalsSnapshot, HeadlineSet, MarketDataProvider, NewsProvider,
    NewsSentiment, Period, PriceSeries, RiskMetrics, ScoreResult, Verdict,
};
use chrono::{DateTime, Utc};
use fundamental_analysis::{project_dividends, DividendProjection, FundamentalAnalysisEngine};
use quant_analysis::QuantAnalysisEngine;
use sentiment_analysis::SentimentAnalysisEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use technical_analysis::{TechnicalAnalysisEngine, TechnicalSnapshot};

pub mod cache;
pub mod comparison;
pub mod presentation;
pub mod state;
pub mod verdict;

pub use cache::CachedProvider;
pub use comparison::{ComparisonResult, ComparisonRow};
pub use state::AppState;
pub use verdict::VerdictClassifier;

/// Position size used for the dividend income projection
pub const DEFAULT_DIVIDEND_INVESTMENT: f64 = 10_000.0;

/// Everything fetched for one ticker, before any computation.
///
/// Price and fundamentals are mandatory; a failed news fetch is carried along so the report
/// can mark sentiment as unavailable instead of neutral.
#[derive(Debug, Clone)]
pub struct TickerInputs {
    pub symbol: String,
    pub period: Period,
    pub prices: PriceSeries,
    pub fundamentals: FundamentalsSnapshot,
    pub headlines: Result<Vec<String>, AnalysisError>,
}

/// Plain-data result for one ticker, ready for any renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerReport {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    /// Company description from the profile, when the provider has one
    pub business_summary: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub period: Period,
    pub price_points: usize,
    pub current_price: Option<f64>,
    pub target_mean_price: Option<f64>,
    /// First-to-last change over the period, in percent
    pub period_return: Option<f64>,
    pub risk: RiskMetrics,
    pub technicals: TechnicalSnapshot,
    pub score: ScoreResult,
    pub verdict: Verdict,
    pub sentiment: NewsSentiment,
    pub headlines: Vec<String>,
    pub dividends: Option<DividendProjection>,
}

impl TickerReport {
    /// Price history too short for risk and technical metrics
    pub fn insufficient_data(&self) -> bool {
        self.risk.insufficient_data
    }
}

pub struct AnalysisOrchestrator {
    market_data: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
    config: EngineConfig,
    technical_analyzer: TechnicalAnalysisEngine,
    fundamental_analyzer: FundamentalAnalysisEngine,
    quant_analyzer: QuantAnalysisEngine,
    sentiment_analyzer: SentimentAnalysisEngine,
    verdict_classifier: VerdictClassifier,
    dividend_investment: f64,
}

impl AnalysisOrchestrator {
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            market_data,
            news,
            technical_analyzer: TechnicalAnalysisEngine::from_config(&config),
            fundamental_analyzer: FundamentalAnalysisEngine::from_config(&config),
            quant_analyzer: QuantAnalysisEngine::from_config(&config),
            sentiment_analyzer: SentimentAnalysisEngine::new(),
            verdict_classifier: VerdictClassifier::new(config.verdict.clone()),
            dividend_investment: DEFAULT_DIVIDEND_INVESTMENT,
            config,
        }
    }

    /// Put one provider (serving both prices and news) behind the TTL cache
    pub fn with_cached_provider<P>(provider: P, config: EngineConfig) -> Self
    where
        P: MarketDataProvider + NewsProvider + 'static,
    {
        let cached = Arc::new(CachedProvider::new(provider, config.cache_ttl_secs));
        Self::new(cached.clone(), cached, config)
    }

    pub fn with_dividend_investment(mut self, amount: f64) -> Self {
        self.dividend_investment = amount;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch price history, fundamentals and headlines concurrently.
    ///
    /// A price or fundamentals failure fails the whole fetch; a news failure does not.
    pub async fn fetch_inputs(&self, symbol: &str, period: Period) -> Result<TickerInputs, AnalysisError> {
        let symbol = symbol.trim().to_uppercase();
        tracing::info!("Fetching {} (period: {})", symbol, period);

        let (prices_result, fundamentals_result, headlines_result) = tokio::join!(
            self.market_data.price_history(&symbol, period),
            self.market_data.fundamentals(&symbol),
            self.news.headlines(&symbol, self.config.headline_limit),
        );

        let prices = prices_result.map_err(|e| {
            tracing::warn!("Price history fetch failed for {}: {}", symbol, e);
            e
        })?;
        let fundamentals = fundamentals_result.map_err(|e| {
            tracing::warn!("Fundamentals fetch failed for {}: {}", symbol, e);
            e
        })?;
        if let Err(e) = &headlines_result {
            tracing::warn!("News fetch failed for {}: {}", symbol, e);
        }

        Ok(TickerInputs {
            symbol,
            period,
            prices,
            fundamentals,
            headlines: headlines_result,
        })
    }

    /// Run every engine over already-fetched inputs. Pure and synchronous.
    pub fn evaluate(&self, inputs: &TickerInputs) -> TickerReport {
        let prices = &inputs.prices;
        let fundamentals = &inputs.fundamentals;
        let closes = prices.closes();

        let risk = self.quant_analyzer.risk_metrics(prices);
        let technicals = self.technical_analyzer.snapshot(prices);
        let score = self.fundamental_analyzer.score(fundamentals, prices);
        let verdict = self.verdict_classifier.classify(&risk, &score);

        let (sentiment, headlines) = match &inputs.headlines {
            Ok(titles) => {
                let set = HeadlineSet::new(titles.iter().cloned(), self.config.headline_limit);
                let sentiment = self.sentiment_analyzer.classify(&set);
                (sentiment, set.iter().map(str::to_string).collect())
            }
            Err(e) => (NewsSentiment::Unavailable { reason: e.to_string() }, Vec::new()),
        };

        let current_price = prices.last_close().or(fundamentals.current_price);

        TickerReport {
            symbol: inputs.symbol.clone(),
            name: fundamentals.long_name.clone(),
            sector: fundamentals.sector.clone(),
            industry: fundamentals.industry.clone(),
            business_summary: fundamentals.business_summary.clone(),
            generated_at: Utc::now(),
            period: inputs.period,
            price_points: prices.len(),
            current_price,
            target_mean_price: fundamentals.target_mean_price,
            period_return: self.quant_analyzer.calculate_period_return(&closes),
            risk,
            technicals,
            score,
            verdict,
            sentiment,
            headlines,
            dividends: project_dividends(fundamentals, current_price, self.dividend_investment),
        }
    }

    /// Fetch and evaluate one ticker
    pub async fn analyze(&self, symbol: &str, period: Period) -> Result<TickerReport, AnalysisError> {
        let inputs = self.fetch_inputs(symbol, period).await?;
        let report = self.evaluate(&inputs);
        tracing::info!(
            "{}: score {} verdict {:?} ({} price points)",
            report.symbol, report.score.score, report.verdict, report.price_points
        );
        Ok(report)
    }
}
