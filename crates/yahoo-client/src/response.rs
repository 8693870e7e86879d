//! Pure decoding of Yahoo Finance response bodies.

use analysis_core::{AnalysisError, FundamentalsSnapshot, PriceBar, PriceSeries};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

// Yahoo pads missing sessions with nulls
#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    news: Vec<SearchNewsItem>,
}

#[derive(Debug, Deserialize)]
struct SearchNewsItem {
    #[serde(default)]
    title: Option<String>,
}

fn upstream(context: &str, e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Upstream(format!("{}: {}", context, e))
}

/// Message out of a Yahoo `error` object, falling back to the raw JSON
fn error_message(error: &Value) -> String {
    error
        .get("description")
        .and_then(Value::as_str)
        .or_else(|| error.get("code").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

/// Decode a `/v8/finance/chart` body into a price series.
///
/// Sessions without a close are skipped; missing open/high/low fall back to the close.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, AnalysisError> {
    let envelope: ChartEnvelope = serde_json::from_str(body).map_err(|e| upstream("chart response", e))?;

    if let Some(error) = envelope.chart.error.filter(|e| !e.is_null()) {
        return Err(AnalysisError::Upstream(format!("{}: {}", symbol, error_message(&error))));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| AnalysisError::Upstream(format!("{}: empty chart result", symbol)))?;

    let quote = result
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();
    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = at(&quote.close, i)?;
            Some(PriceBar {
                timestamp: DateTime::from_timestamp(ts, 0)?,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume: at(&quote.volume, i).unwrap_or(0.0),
            })
        })
        .collect();

    PriceSeries::new(bars).map_err(|e| upstream(symbol, e))
}

/// `{raw, fmt}` numeric field; absent, `{}` and null all read as missing
fn raw(module: Option<&Value>, key: &str) -> Option<f64> {
    let number = match module?.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("raw").and_then(Value::as_f64),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn text(module: Option<&Value>, key: &str) -> Option<String> {
    module?
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Decode a `/v10/finance/quoteSummary` body into a fundamentals snapshot
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<FundamentalsSnapshot, AnalysisError> {
    let envelope: Value = serde_json::from_str(body).map_err(|e| upstream("quoteSummary response", e))?;
    let summary = envelope
        .get("quoteSummary")
        .ok_or_else(|| AnalysisError::Upstream(format!("{}: missing quoteSummary", symbol)))?;

    if let Some(error) = summary.get("error").filter(|e| !e.is_null()) {
        return Err(AnalysisError::Upstream(format!("{}: {}", symbol, error_message(error))));
    }

    let result = summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .ok_or_else(|| AnalysisError::Upstream(format!("{}: empty quoteSummary result", symbol)))?;

    let financial = result.get("financialData");
    let stats = result.get("defaultKeyStatistics");
    let detail = result.get("summaryDetail");
    let profile = result.get("assetProfile");
    let price = result.get("price");

    Ok(FundamentalsSnapshot {
        profit_margin: raw(financial, "profitMargins").or_else(|| raw(stats, "profitMargins")),
        revenue_growth: raw(financial, "revenueGrowth"),
        trailing_pe: raw(detail, "trailingPE"),
        peg_ratio: raw(stats, "pegRatio").or_else(|| raw(stats, "trailingPegRatio")),
        roe: raw(financial, "returnOnEquity"),
        roa: raw(financial, "returnOnAssets"),
        current_ratio: raw(financial, "currentRatio"),
        beta: raw(stats, "beta").or_else(|| raw(detail, "beta")),
        debt_to_equity: raw(financial, "debtToEquity"),
        total_cash: raw(financial, "totalCash"),
        total_debt: raw(financial, "totalDebt"),
        free_cash_flow: raw(financial, "freeCashflow"),
        dividend_yield: raw(detail, "dividendYield"),
        dividend_rate: raw(detail, "dividendRate"),
        target_mean_price: raw(financial, "targetMeanPrice"),
        market_cap: raw(price, "marketCap").or_else(|| raw(detail, "marketCap")),
        current_price: raw(financial, "currentPrice").or_else(|| raw(price, "regularMarketPrice")),
        long_name: text(price, "longName").or_else(|| text(price, "shortName")),
        sector: text(profile, "sector"),
        industry: text(profile, "industry"),
        business_summary: text(profile, "longBusinessSummary"),
    })
}

/// Headline titles from a `/v1/finance/search` body, in response order
pub fn parse_search_news(body: &str, limit: usize) -> Result<Vec<String>, AnalysisError> {
    let envelope: SearchEnvelope = serde_json::from_str(body).map_err(|e| upstream("search response", e))?;
    Ok(envelope
        .news
        .into_iter()
        .filter_map(|n| n.title)
        .filter(|t| !t.trim().is_empty())
        .take(limit)
        .collect())
}

/// Validate a `/v1/test/getcrumb` body. Yahoo answers failures with HTML pages, JSON errors
/// or a rate-limit sentence rather than a status code.
pub fn parse_crumb(body: &str) -> Result<String, AnalysisError> {
    let crumb = body.trim();
    if crumb.to_lowercase().contains("too many requests") {
        return Err(AnalysisError::Upstream("rate limited while fetching crumb".to_string()));
    }
    let plausible = !crumb.is_empty()
        && crumb.len() < 100
        && !crumb.contains(char::is_whitespace)
        && !crumb.starts_with('<')
        && !crumb.starts_with('{');
    if !plausible {
        let snippet: String = crumb.chars().take(60).collect();
        return Err(AnalysisError::Upstream(format!("unusable crumb response: {:?}", snippet)));
    }
    Ok(crumb.to_string())
}

/// True when a response says the session crumb or cookie was rejected
pub fn is_invalid_crumb(status: u16, body: &str) -> bool {
    status == 401 || body.contains("Invalid Crumb") || body.contains("Invalid Cookie")
}
