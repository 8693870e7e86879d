//! Engine calibration.
//!
//! The dashboard iterations disagree on thresholds and weights, so every cutoff the engines
//! use lives here as a named, overridable value. `Default` is the calibration this workspace
//! ships with; `from_env` lets a deployment override any field with a `PRIME_*` variable.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Thresholds and point values of the composite score rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub trend_points: u32,
    /// PEG strictly between 0 and this value earns `valuation_points`
    pub peg_max: f64,
    pub valuation_points: u32,
    /// Partial credit when the PEG rule does not fire and 0 < trailing P/E < `pe_max`
    pub pe_max: f64,
    pub pe_partial_points: u32,
    pub profit_margin_min: f64,
    pub profitability_points: u32,
    pub roe_min: f64,
    pub efficiency_points: u32,
    pub revenue_growth_min: f64,
    pub growth_points: u32,
    pub safety_points: u32,
    /// Upper clamp of the final score
    pub max_score: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            trend_points: 20,
            peg_max: 2.0,
            valuation_points: 20,
            pe_max: 25.0,
            pe_partial_points: 10,
            profit_margin_min: 0.15,
            profitability_points: 20,
            roe_min: 0.15,
            efficiency_points: 20,
            revenue_growth_min: 0.10,
            growth_points: 20,
            safety_points: 20,
            max_score: 100,
        }
    }
}

/// Cutoffs of the verdict classifier, evaluated in priority order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictThresholds {
    /// Max drawdown (percent, negative) below which a ticker is `HighRisk`
    pub high_risk_drawdown: f64,
    pub gem_min_sharpe: f64,
    pub gem_min_score: u32,
    pub solid_min_score: u32,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            high_risk_drawdown: -40.0,
            gem_min_sharpe: 1.0,
            gem_min_score: 70,
            solid_min_score: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub verdict: VerdictThresholds,
    /// Annual risk-free rate used by the Sharpe ratio
    pub risk_free_rate: f64,
    pub rsi_window: usize,
    pub short_trend_window: usize,
    pub long_trend_window: usize,
    pub headline_limit: usize,
    pub cache_ttl_secs: i64,
    pub compare_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            verdict: VerdictThresholds::default(),
            risk_free_rate: 0.04,
            rsi_window: 14,
            short_trend_window: 50,
            long_trend_window: 200,
            headline_limit: 8,
            cache_ttl_secs: 300,
            compare_timeout_secs: 20,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `PRIME_*` environment variables.
    ///
    /// Unset or unparseable variables keep the default value.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn read<T: FromStr>(lookup: &dyn Fn(&str) -> Option<String>, key: &str, current: &mut T) {
            if let Some(v) = lookup(key).and_then(|raw| raw.trim().parse().ok()) {
                *current = v;
            }
        }

        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;
        let mut cfg = Self::default();

        read(lookup, "PRIME_RISK_FREE_RATE", &mut cfg.risk_free_rate);
        read(lookup, "PRIME_RSI_WINDOW", &mut cfg.rsi_window);
        read(lookup, "PRIME_SHORT_TREND_WINDOW", &mut cfg.short_trend_window);
        read(lookup, "PRIME_LONG_TREND_WINDOW", &mut cfg.long_trend_window);
        read(lookup, "PRIME_HEADLINE_LIMIT", &mut cfg.headline_limit);
        read(lookup, "PRIME_CACHE_TTL_SECS", &mut cfg.cache_ttl_secs);
        read(lookup, "PRIME_COMPARE_TIMEOUT_SECS", &mut cfg.compare_timeout_secs);

        let s = &mut cfg.scoring;
        read(lookup, "PRIME_TREND_POINTS", &mut s.trend_points);
        read(lookup, "PRIME_PEG_MAX", &mut s.peg_max);
        read(lookup, "PRIME_VALUATION_POINTS", &mut s.valuation_points);
        read(lookup, "PRIME_PE_MAX", &mut s.pe_max);
        read(lookup, "PRIME_PE_PARTIAL_POINTS", &mut s.pe_partial_points);
        read(lookup, "PRIME_PROFIT_MARGIN_MIN", &mut s.profit_margin_min);
        read(lookup, "PRIME_PROFITABILITY_POINTS", &mut s.profitability_points);
        read(lookup, "PRIME_ROE_MIN", &mut s.roe_min);
        read(lookup, "PRIME_EFFICIENCY_POINTS", &mut s.efficiency_points);
        read(lookup, "PRIME_REVENUE_GROWTH_MIN", &mut s.revenue_growth_min);
        read(lookup, "PRIME_GROWTH_POINTS", &mut s.growth_points);
        read(lookup, "PRIME_SAFETY_POINTS", &mut s.safety_points);
        read(lookup, "PRIME_MAX_SCORE", &mut s.max_score);

        let v = &mut cfg.verdict;
        read(lookup, "PRIME_HIGH_RISK_DRAWDOWN", &mut v.high_risk_drawdown);
        read(lookup, "PRIME_GEM_MIN_SHARPE", &mut v.gem_min_sharpe);
        read(lookup, "PRIME_GEM_MIN_SCORE", &mut v.gem_min_score);
        read(lookup, "PRIME_SOLID_MIN_SCORE", &mut v.solid_min_score);

        cfg
    }
}
