use analysis_core::{EngineConfig, PriceSeries};
use serde::{Deserialize, Serialize};

use crate::indicators::*;

/// Conventional RSI bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

impl RsiZone {
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi > 70.0 {
            RsiZone::Overbought
        } else if rsi < 30.0 {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

/// Per-request technical summary of a price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub last_close: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi_zone: Option<RsiZone>,
    pub short_trend: Option<MovingAverage>,
    pub long_trend: Option<MovingAverage>,
    /// Short window, weighted toward recent closes
    pub weighted_trend: Option<MovingAverage>,
    /// Fewer than two points: nothing but the last close is meaningful
    pub insufficient_data: bool,
}

impl TechnicalSnapshot {
    /// True when the last close sits above the long trend average
    pub fn above_long_trend(&self) -> Option<bool> {
        Some(self.last_close? > self.long_trend?.value)
    }
}

pub struct TechnicalAnalysisEngine {
    rsi_window: usize,
    short_window: usize,
    long_window: usize,
}

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            rsi_window: config.rsi_window,
            short_window: config.short_trend_window,
            long_window: config.long_trend_window,
        }
    }

    pub fn snapshot(&self, series: &PriceSeries) -> TechnicalSnapshot {
        let closes = series.closes();
        let rsi = latest_rsi(&closes, self.rsi_window);

        TechnicalSnapshot {
            last_close: closes.last().copied(),
            rsi,
            rsi_zone: rsi.map(RsiZone::from_rsi),
            short_trend: moving_average(&closes, self.short_window),
            long_trend: moving_average(&closes, self.long_window),
            weighted_trend: weighted_moving_average(&closes, self.short_window),
            insufficient_data: closes.len() < 2,
        }
    }

    /// Long-window trend average used by the scoring trend rule
    pub fn long_trend(&self, series: &PriceSeries) -> Option<MovingAverage> {
        moving_average(&series.closes(), self.long_window)
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
