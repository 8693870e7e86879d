use analysis_core::{
    EngineConfig, FundamentalsSnapshot, PriceSeries, ScoreReason, ScoreResult, ScoreRule, ScoringConfig,
};
use technical_analysis::moving_average;

/// Composite 0-100 score from independent rules over fundamentals and the price trend.
///
/// A rule whose inputs are missing does not fire. The order of `reasons` follows rule
/// evaluation order and has no effect on the score.
pub struct FundamentalAnalysisEngine {
    config: ScoringConfig,
    trend_window: usize,
}

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            config: config.scoring.clone(),
            trend_window: config.long_trend_window,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, fundamentals: &FundamentalsSnapshot, prices: &PriceSeries) -> ScoreResult {
        let cfg = &self.config;
        let mut signals: Vec<ScoreReason> = Vec::new();

        // Trend: last close above the long trend average (or the period average on short history)
        let closes = prices.closes();
        if let (Some(&current), Some(ma)) = (closes.last(), moving_average(&closes, self.trend_window)) {
            if current > ma.value {
                signals.push(ScoreReason {
                    rule: ScoreRule::Trend,
                    points: cfg.trend_points,
                    detail: format!("Price {:.2} above {} {:.2}", current, ma.label(), ma.value),
                });
            }
        }

        // Valuation: PEG first, trailing P/E as partial credit
        if let Some(peg) = fundamentals.peg_ratio.filter(|&p| p > 0.0 && p < cfg.peg_max) {
            signals.push(ScoreReason {
                rule: ScoreRule::Valuation,
                points: cfg.valuation_points,
                detail: format!("PEG ratio {:.2} below {:.1}", peg, cfg.peg_max),
            });
        } else if let Some(pe) = fundamentals.trailing_pe.filter(|&pe| pe > 0.0 && pe < cfg.pe_max) {
            signals.push(ScoreReason {
                rule: ScoreRule::Valuation,
                points: cfg.pe_partial_points,
                detail: format!("Trailing P/E {:.2} below {:.0}", pe, cfg.pe_max),
            });
        }

        if let Some(pm) = fundamentals.profit_margin.filter(|&pm| pm > cfg.profit_margin_min) {
            signals.push(ScoreReason {
                rule: ScoreRule::Profitability,
                points: cfg.profitability_points,
                detail: format!("Profit margin {:.1}%", pm * 100.0),
            });
        }

        if let Some(roe) = fundamentals.roe.filter(|&roe| roe > cfg.roe_min) {
            signals.push(ScoreReason {
                rule: ScoreRule::Efficiency,
                points: cfg.efficiency_points,
                detail: format!("Return on equity {:.1}%", roe * 100.0),
            });
        }

        if let Some(rg) = fundamentals.revenue_growth.filter(|&rg| rg > cfg.revenue_growth_min) {
            signals.push(ScoreReason {
                rule: ScoreRule::Growth,
                points: cfg.growth_points,
                detail: format!("Revenue growth {:.1}%", rg * 100.0),
            });
        }

        // Safety: positive free cash flow, else a cash pile larger than debt. Never both.
        let cash_over_debt = match (fundamentals.total_cash, fundamentals.total_debt) {
            (Some(cash), Some(debt)) => cash > debt,
            _ => false,
        };
        if fundamentals.free_cash_flow.map_or(false, |fcf| fcf > 0.0) {
            signals.push(ScoreReason {
                rule: ScoreRule::Safety,
                points: cfg.safety_points,
                detail: "Positive free cash flow".to_string(),
            });
        } else if cash_over_debt {
            signals.push(ScoreReason {
                rule: ScoreRule::Safety,
                points: cfg.safety_points,
                detail: "Cash exceeds total debt".to_string(),
            });
        }

        // configured weights are unbounded, so the sum saturates before clamping
        let total = signals.iter().fold(0u32, |acc, s| acc.saturating_add(s.points));

        ScoreResult {
            score: total.min(cfg.max_score).min(100),
            reasons: signals,
        }
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
