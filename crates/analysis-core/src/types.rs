use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::AnalysisError;

/// Daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Price history for one request: ascending timestamps, no duplicates, positive finite closes.
///
/// Construction validates the ordering so every consumer can divide by a previous close
/// without guarding against zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Sorts bars by timestamp and rejects duplicate timestamps or unusable closes.
    pub fn new(mut bars: Vec<PriceBar>) -> Result<Self, AnalysisError> {
        if let Some(bad) = bars.iter().find(|b| !b.close.is_finite() || b.close <= 0.0) {
            return Err(AnalysisError::InvalidData(format!(
                "close {} at {} is not a positive finite price",
                bad.close, bad.timestamp
            )));
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(w) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(AnalysisError::InvalidData(format!(
                "duplicate bar timestamp {}",
                w[0].timestamp
            )));
        }

        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self { bars: Vec::new() }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.timestamp)
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = AnalysisError;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self, Self::Error> {
        PriceSeries::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

/// Point-in-time company attributes as reported by the data provider.
///
/// Every field is optional: `None` means unknown, which is distinct from a reported zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsSnapshot {
    #[serde(default, alias = "profitMargins")]
    pub profit_margin: Option<f64>,
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    #[serde(default, rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(default, alias = "trailingPegRatio")]
    pub peg_ratio: Option<f64>,
    #[serde(default, alias = "returnOnEquity")]
    pub roe: Option<f64>,
    #[serde(default, alias = "returnOnAssets")]
    pub roa: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub total_cash: Option<f64>,
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default, alias = "freeCashflow")]
    pub free_cash_flow: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub dividend_rate: Option<f64>,
    #[serde(default)]
    pub target_mean_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default, alias = "longBusinessSummary")]
    pub business_summary: Option<String>,
}

/// Deduplicated, ordered, capped list of headline titles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlineSet {
    headlines: Vec<String>,
}

impl HeadlineSet {
    pub const DEFAULT_LIMIT: usize = 8;

    /// Keeps the first occurrence of each trimmed, non-empty title, up to `limit` titles.
    pub fn new<I, S>(titles: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut headlines = Vec::new();
        for title in titles {
            if headlines.len() >= limit {
                break;
            }
            let title: String = title.into();
            let trimmed = title.trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
                continue;
            }
            headlines.push(trimmed.to_string());
        }
        Self { headlines }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.headlines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.headlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headlines.is_empty()
    }
}

/// Rule families of the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreRule {
    Trend,
    Valuation,
    Profitability,
    Efficiency,
    Growth,
    Safety,
}

/// One fired rule: its points and a plain-text explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReason {
    pub rule: ScoreRule,
    pub points: u32,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 0 to 100
    pub score: u32,
    pub reasons: Vec<ScoreReason>,
}

impl ScoreResult {
    pub fn reason_texts(&self) -> Vec<&str> {
        self.reasons.iter().map(|r| r.detail.as_str()).collect()
    }

    pub fn fired(&self, rule: ScoreRule) -> bool {
        self.reasons.iter().any(|r| r.rule == rule)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Annualized, in percent
    pub volatility: f64,
    /// Peak-to-trough, in percent, always <= 0
    pub max_drawdown: f64,
    pub sharpe: f64,
    /// Set when the series had fewer than two points and the values are defaults
    pub insufficient_data: bool,
}

impl RiskMetrics {
    pub fn insufficient() -> Self {
        Self {
            insufficient_data: true,
            ..Self::default()
        }
    }
}

/// Final classification of a ticker. Decoration belongs to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    HighRisk,
    Gem,
    Solid,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub label: SentimentLabel,
    pub polarity: i32,
    pub positive_headlines: usize,
    pub negative_headlines: usize,
    pub headline_count: usize,
}

/// News sentiment as seen by a report.
///
/// `NoHeadlines` is a successful classification of an empty set; `Unavailable` is only ever
/// produced by callers when the news fetch itself failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NewsSentiment {
    Classified(SentimentReport),
    NoHeadlines,
    Unavailable { reason: String },
}

impl NewsSentiment {
    /// Label when a classification exists; `None` for `Unavailable`
    pub fn label(&self) -> Option<SentimentLabel> {
        match self {
            NewsSentiment::Classified(report) => Some(report.label),
            NewsSentiment::NoHeadlines => Some(SentimentLabel::Neutral),
            NewsSentiment::Unavailable { .. } => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, NewsSentiment::Unavailable { .. })
    }
}

/// Lookback window requested from the market-data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "max" => Ok(Period::Max),
            other => Err(AnalysisError::InvalidData(format!("unknown period '{}'", other))),
        }
    }
}
