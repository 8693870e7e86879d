use analysis_core::{RiskMetrics, ScoreResult, Verdict, VerdictThresholds};

/// First matching rule wins:
/// drawdown breach -> `HighRisk`, strong Sharpe and score -> `Gem`, good score -> `Solid`,
/// otherwise `Neutral`.
#[derive(Debug, Clone, Default)]
pub struct VerdictClassifier {
    thresholds: VerdictThresholds,
}

impl VerdictClassifier {
    pub fn new(thresholds: VerdictThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &VerdictThresholds {
        &self.thresholds
    }

    pub fn classify(&self, risk: &RiskMetrics, score: &ScoreResult) -> Verdict {
        let t = &self.thresholds;

        if risk.max_drawdown < t.high_risk_drawdown {
            Verdict::HighRisk
        } else if risk.sharpe > t.gem_min_sharpe && score.score > t.gem_min_score {
            Verdict::Gem
        } else if score.score > t.solid_min_score {
            Verdict::Solid
        } else {
            Verdict::Neutral
        }
    }
}
