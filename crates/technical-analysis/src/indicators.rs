use serde::{Deserialize, Serialize};

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Linearly Weighted Moving Average (most recent value weighs `period`, oldest weighs 1)
pub fn wma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let denominator = (period * (period + 1)) as f64 / 2.0;
    data.windows(period)
        .map(|w| {
            w.iter()
                .enumerate()
                .map(|(i, v)| v * (i + 1) as f64)
                .sum::<f64>()
                / denominator
        })
        .collect()
}

/// Relative Strength Index over simple rolling means of gains and losses.
///
/// The output is aligned with `data`: index `i` holds the RSI as of `data[i]`, and the first
/// `period` entries are `None` because the lookback is incomplete. A window without losses
/// saturates at 100.
pub fn rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut rsi_values = vec![None; data.len()];
    if period == 0 || data.len() < period + 1 {
        return rsi_values;
    }

    let gains: Vec<f64> = data.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = data.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    // gains[j] is the delta ending at data[j + 1]
    for i in period..data.len() {
        let avg_gain = gains[i - period..i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[i - period..i].iter().sum::<f64>() / period as f64;
        rsi_values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    rsi_values
}

/// Most recent RSI value, `None` until `period + 1` points exist
pub fn latest_rsi(data: &[f64], period: usize) -> Option<f64> {
    rsi(data, period).last().copied().flatten()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovingAverageKind {
    /// Full window of history was available
    Windowed,
    /// Full window, linearly weighted toward recent closes
    Weighted,
    /// History was shorter than the window; mean of everything available
    PeriodAverage,
}

/// Latest value of a trend average, tagged with the variant actually computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    pub value: f64,
    /// Number of points averaged
    pub window: usize,
    pub kind: MovingAverageKind,
}

impl MovingAverage {
    /// "SMA200" / "WMA50" for a full window, "period average" for the fallback
    pub fn label(&self) -> String {
        match self.kind {
            MovingAverageKind::Windowed => format!("SMA{}", self.window),
            MovingAverageKind::Weighted => format!("WMA{}", self.window),
            MovingAverageKind::PeriodAverage => "period average".to_string(),
        }
    }
}

/// Latest simple moving average over `window`, degrading to the mean of the whole series
/// when there is not enough history. `None` only for an empty series.
pub fn moving_average(data: &[f64], window: usize) -> Option<MovingAverage> {
    if data.is_empty() {
        return None;
    }

    if window > 0 && data.len() >= window {
        let value = sma(&data[data.len() - window..], window).last().copied()?;
        return Some(MovingAverage {
            value,
            window,
            kind: MovingAverageKind::Windowed,
        });
    }

    Some(period_average(data))
}

fn period_average(data: &[f64]) -> MovingAverage {
    MovingAverage {
        value: data.iter().sum::<f64>() / data.len() as f64,
        window: data.len(),
        kind: MovingAverageKind::PeriodAverage,
    }
}

/// Latest weighted moving average over `window`, with the same period-average fallback as
/// [`moving_average`]. `None` only for an empty series.
pub fn weighted_moving_average(data: &[f64], window: usize) -> Option<MovingAverage> {
    if data.is_empty() {
        return None;
    }

    if window > 0 && data.len() >= window {
        let value = wma(&data[data.len() - window..], window).last().copied()?;
        return Some(MovingAverage {
            value,
            window,
            kind: MovingAverageKind::Weighted,
        });
    }

    Some(period_average(data))
}
