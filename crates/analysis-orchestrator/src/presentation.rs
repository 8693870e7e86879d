//! Display text and decoration for engine labels, plus plain-text report rendering.
//!
//! The engine crates return typed labels only; this is the one place that decides how they
//! look.

use crate::{ComparisonResult, ComparisonRow, TickerReport};
use analysis_core::{NewsSentiment, SentimentLabel, Verdict};
use std::fmt::Write;
use technical_analysis::{MovingAverageKind, RsiZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub text: &'static str,
    pub glyph: Option<&'static str>,
}

impl Label {
    const fn new(text: &'static str, glyph: &'static str) -> Self {
        Self { text, glyph: Some(glyph) }
    }

    const fn plain(text: &'static str) -> Self {
        Self { text, glyph: None }
    }

    /// Text with the glyph in front when decorations are on
    pub fn render(&self, decorated: bool) -> String {
        match (decorated, self.glyph) {
            (true, Some(glyph)) => format!("{} {}", glyph, self.text),
            _ => self.text.to_string(),
        }
    }
}

pub fn verdict_label(verdict: Verdict) -> Label {
    match verdict {
        Verdict::HighRisk => Label::new("High risk: deep drawdown", "🔴"),
        Verdict::Gem => Label::new("Gem: strong score and risk-adjusted return", "💎"),
        Verdict::Solid => Label::new("Solid opportunity", "🟢"),
        Verdict::Neutral => Label::new("Neutral / moderate risk", "🟡"),
    }
}

pub fn sentiment_label(label: SentimentLabel) -> Label {
    match label {
        SentimentLabel::Positive => Label::new("Positive", "📈"),
        SentimentLabel::Negative => Label::new("Negative", "📉"),
        SentimentLabel::Neutral => Label::new("Neutral", "➖"),
    }
}

/// Includes the two non-classified states so "no news" and "news unavailable" read differently
pub fn news_sentiment_label(sentiment: &NewsSentiment) -> Label {
    match sentiment {
        NewsSentiment::Classified(report) => sentiment_label(report.label),
        NewsSentiment::NoHeadlines => Label::plain("Neutral (no recent headlines)"),
        NewsSentiment::Unavailable { .. } => Label::new("Unavailable", "⚠️"),
    }
}

pub fn rsi_zone_label(zone: RsiZone) -> Label {
    match zone {
        RsiZone::Overbought => Label::new("Overbought", "🔥"),
        RsiZone::Oversold => Label::new("Oversold", "🧊"),
        RsiZone::Neutral => Label::plain("Neutral"),
    }
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.2}{}", v, suffix),
        None => "n/a".to_string(),
    }
}

pub fn render_text_report(report: &TickerReport, decorated: bool) -> String {
    let mut out = String::new();

    let title = match &report.name {
        Some(name) => format!("{} ({})", name, report.symbol),
        None => report.symbol.clone(),
    };
    let _ = writeln!(out, "{}", title);
    if let (Some(sector), Some(industry)) = (&report.sector, &report.industry) {
        let _ = writeln!(out, "{} / {}", sector, industry);
    }
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count().max(20)));
    if let Some(summary) = report.business_summary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "About: {}", summary);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Price:          {}", fmt_opt(report.current_price, ""));
    let _ = writeln!(out, "Period return:  {} ({})", fmt_opt(report.period_return, "%"), report.period);
    if let Some(target) = report.target_mean_price {
        let _ = writeln!(out, "Analyst target: {:.2}", target);
    }
    let _ = writeln!(out, "Score:          {}/100", report.score.score);
    let _ = writeln!(out, "Verdict:        {}", verdict_label(report.verdict).render(decorated));

    let _ = writeln!(out);
    if report.insufficient_data() {
        let _ = writeln!(out, "Risk: insufficient price history ({} points)", report.price_points);
    } else {
        let _ = writeln!(out, "Volatility:     {:.2}%", report.risk.volatility);
        let _ = writeln!(out, "Max drawdown:   {:.2}%", report.risk.max_drawdown);
        let _ = writeln!(out, "Sharpe:         {:.2}", report.risk.sharpe);
    }

    let t = &report.technicals;
    let rsi = match (t.rsi, t.rsi_zone) {
        (Some(rsi), Some(zone)) => format!("{:.1} ({})", rsi, rsi_zone_label(zone).render(decorated)),
        _ => "n/a".to_string(),
    };
    let _ = writeln!(out, "RSI:            {}", rsi);
    for trend in [&t.short_trend, &t.long_trend].into_iter().flatten() {
        let _ = writeln!(out, "{:<15} {:.2}", format!("{}:", trend.label()), trend.value);
    }
    // the fallback would only repeat the period average printed above
    if let Some(w) = t.weighted_trend.filter(|w| w.kind == MovingAverageKind::Weighted) {
        let _ = writeln!(out, "{:<15} {:.2}", format!("{}:", w.label()), w.value);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Why it scores:");
    if report.score.reasons.is_empty() {
        let _ = writeln!(out, "  (no scoring rule fired)");
    }
    for reason in &report.score.reasons {
        let bullet = if decorated { "✅" } else { "-" };
        let _ = writeln!(out, "  {} {} (+{})", bullet, reason.detail, reason.points);
    }

    if let Some(div) = &report.dividends {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Dividend yield {:.2}%: {:.2}/year, {:.2}/month on {:.0} invested",
            div.yield_fraction * 100.0,
            div.annual_income,
            div.monthly_income,
            div.invested
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "News sentiment: {}", news_sentiment_label(&report.sentiment).render(decorated));
    if let NewsSentiment::Unavailable { reason } = &report.sentiment {
        let _ = writeln!(out, "  {}", reason);
    }
    for headline in &report.headlines {
        let _ = writeln!(out, "  * {}", headline);
    }

    out
}

pub fn render_comparison(result: &ComparisonResult, decorated: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>6} {:>9} {:>9} {:>7}  {}",
        "Ticker", "Score", "Vol %", "MaxDD %", "Sharpe", "Verdict"
    );

    for row in &result.rows {
        match row {
            ComparisonRow::Report(r) => {
                let _ = writeln!(
                    out,
                    "{:<8} {:>6} {:>9.2} {:>9.2} {:>7.2}  {}",
                    r.symbol,
                    r.score.score,
                    r.risk.volatility,
                    r.risk.max_drawdown,
                    r.risk.sharpe,
                    verdict_label(r.verdict).render(decorated)
                );
            }
            ComparisonRow::Failed { symbol, error, .. } => {
                let _ = writeln!(out, "{:<8} failed: {}", symbol, error);
            }
        }
    }

    let ranked = result.ranked();
    if !ranked.is_empty() {
        let order: Vec<&str> = ranked.iter().map(|r| r.symbol.as_str()).collect();
        let _ = writeln!(out, "\nRanking: {}", order.join(" > "));
    }
    out
}
