use analysis_core::{EngineConfig, PriceSeries, RiskMetrics};
use rayon::prelude::*;
use statrs::statistics::Statistics;

const TRADING_DAYS: f64 = 252.0;

pub struct QuantAnalysisEngine {
    risk_free_rate: f64,
}

impl QuantAnalysisEngine {
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            risk_free_rate: config.risk_free_rate,
        }
    }

    /// Calculate simple daily returns from prices
    pub fn calculate_returns(&self, prices: &[f64]) -> Vec<f64> {
        prices
            .windows(2)
            .map(|w| w[1] / w[0] - 1.0)
            .collect()
    }

    /// Sample standard deviation, 0.0 when fewer than two values
    fn sample_std_dev(&self, returns: &[f64]) -> f64 {
        if returns.len() < 2 {
            return 0.0;
        }
        let sd = returns.std_dev();
        if sd.is_finite() { sd } else { 0.0 }
    }

    /// Annualized volatility in percent
    pub fn calculate_volatility(&self, returns: &[f64]) -> f64 {
        self.sample_std_dev(returns) * TRADING_DAYS.sqrt() * 100.0
    }

    /// Maximum drawdown in percent relative to the running peak (always <= 0)
    pub fn calculate_max_drawdown(&self, prices: &[f64]) -> f64 {
        let mut peak = match prices.first() {
            Some(&p) => p,
            None => return 0.0,
        };
        let mut max_dd: f64 = 0.0;

        for &price in prices {
            if price > peak {
                peak = price;
            }
            max_dd = max_dd.min(price / peak - 1.0);
        }

        max_dd * 100.0
    }

    /// Annualized Sharpe ratio; 0.0 for a series without variance
    pub fn calculate_sharpe_ratio(&self, returns: &[f64]) -> f64 {
        let std_dev = self.sample_std_dev(returns);
        if std_dev == 0.0 {
            return 0.0;
        }

        let annualized_return = returns.mean() * TRADING_DAYS;
        let annualized_volatility = std_dev * TRADING_DAYS.sqrt();

        (annualized_return - self.risk_free_rate) / annualized_volatility
    }

    /// First-to-last change in percent, `None` for fewer than two points
    pub fn calculate_period_return(&self, prices: &[f64]) -> Option<f64> {
        match (prices.first(), prices.last()) {
            (Some(first), Some(last)) if prices.len() >= 2 => Some((last / first - 1.0) * 100.0),
            _ => None,
        }
    }

    /// Volatility, drawdown and Sharpe for a series; all-zero with the insufficient flag
    /// when there are fewer than two points
    pub fn risk_metrics(&self, series: &PriceSeries) -> RiskMetrics {
        if series.len() < 2 {
            return RiskMetrics::insufficient();
        }

        let prices = series.closes();
        let returns = self.calculate_returns(&prices);

        RiskMetrics {
            volatility: self.calculate_volatility(&returns),
            max_drawdown: self.calculate_max_drawdown(&prices),
            sharpe: self.calculate_sharpe_ratio(&returns),
            insufficient_data: false,
        }
    }

    /// Risk metrics for many independent series, computed in parallel
    pub fn batch_risk_metrics(&self, series: &[PriceSeries]) -> Vec<RiskMetrics> {
        series.par_iter().map(|s| self.risk_metrics(s)).collect()
    }
}

impl Default for QuantAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
