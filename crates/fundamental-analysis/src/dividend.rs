use analysis_core::FundamentalsSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YieldSource {
    Reported,
    DerivedFromRate,
}

/// Income projection for a position of `invested` currency units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendProjection {
    /// Yield as a fraction (0.031 = 3.1%)
    pub yield_fraction: f64,
    pub annual_rate_per_share: Option<f64>,
    pub invested: f64,
    pub annual_income: f64,
    pub monthly_income: f64,
    pub source: YieldSource,
}

impl DividendProjection {
    /// Income for each of the next `years` years with dividends compounding at `annual_growth`
    pub fn project_income(&self, years: u32, annual_growth: f64) -> Vec<f64> {
        (1..=years)
            .map(|year| self.annual_income * (1.0 + annual_growth).powi(year as i32 - 1))
            .collect()
    }
}

/// Providers report the yield either as a fraction or as a percentage.
fn normalize_yield(raw: f64) -> f64 {
    if raw > 1.0 { raw / 100.0 } else { raw }
}

/// Resolve the dividend yield and project income for `invested`.
///
/// `None` when the yield is unknown: no reported yield and no rate/price pair to derive it
/// from. A reported zero yield is a valid "no dividend" projection.
pub fn project_dividends(
    fundamentals: &FundamentalsSnapshot,
    price: Option<f64>,
    invested: f64,
) -> Option<DividendProjection> {
    let price = price.or(fundamentals.current_price).filter(|p| p.is_finite() && *p > 0.0);

    let (yield_fraction, source) = match fundamentals.dividend_yield.filter(|y| y.is_finite() && *y >= 0.0) {
        Some(y) => (normalize_yield(y), YieldSource::Reported),
        None => {
            let rate = fundamentals.dividend_rate.filter(|r| r.is_finite() && *r >= 0.0)?;
            (rate / price?, YieldSource::DerivedFromRate)
        }
    };

    let annual_income = invested * yield_fraction;

    Some(DividendProjection {
        yield_fraction,
        annual_rate_per_share: fundamentals
            .dividend_rate
            .or_else(|| price.map(|p| p * yield_fraction)),
        invested,
        annual_income,
        monthly_income: annual_income / 12.0,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_fraction_yield() {
        let f = FundamentalsSnapshot {
            dividend_yield: Some(0.04),
            dividend_rate: Some(2.0),
            ..Default::default()
        };
        let p = project_dividends(&f, Some(50.0), 10_000.0).unwrap();
        assert_eq!(p.source, YieldSource::Reported);
        assert!((p.annual_income - 400.0).abs() < 1e-9);
        assert!((p.monthly_income - 400.0 / 12.0).abs() < 1e-9);
        assert_eq!(p.annual_rate_per_share, Some(2.0));
    }

    #[test]
    fn test_percentage_yield_is_normalized() {
        let f = FundamentalsSnapshot {
            dividend_yield: Some(3.5),
            ..Default::default()
        };
        let p = project_dividends(&f, Some(100.0), 1_000.0).unwrap();
        assert!((p.yield_fraction - 0.035).abs() < 1e-12);
        assert!((p.annual_rate_per_share.unwrap() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_yield_derived_from_rate() {
        let f = FundamentalsSnapshot {
            dividend_rate: Some(1.0),
            current_price: Some(40.0),
            ..Default::default()
        };
        let p = project_dividends(&f, None, 4_000.0).unwrap();
        assert_eq!(p.source, YieldSource::DerivedFromRate);
        assert!((p.yield_fraction - 0.025).abs() < 1e-12);
        assert!((p.annual_income - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_yield_is_none() {
        assert!(project_dividends(&FundamentalsSnapshot::default(), Some(10.0), 1_000.0).is_none());

        // rate without a usable price
        let f = FundamentalsSnapshot {
            dividend_rate: Some(1.0),
            ..Default::default()
        };
        assert!(project_dividends(&f, Some(0.0), 1_000.0).is_none());
    }

    #[test]
    fn test_zero_yield_is_a_projection() {
        let f = FundamentalsSnapshot {
            dividend_yield: Some(0.0),
            ..Default::default()
        };
        let p = project_dividends(&f, None, 1_000.0).unwrap();
        assert_eq!(p.annual_income, 0.0);
    }

    #[test]
    fn test_project_income_compounds() {
        let f = FundamentalsSnapshot {
            dividend_yield: Some(0.05),
            ..Default::default()
        };
        let p = project_dividends(&f, None, 1_000.0).unwrap();
        let series = p.project_income(3, 0.10);
        assert_eq!(series.len(), 3);
        assert!((series[0] - 50.0).abs() < 1e-9);
        assert!((series[1] - 55.0).abs() < 1e-9);
        assert!((series[2] - 60.5).abs() < 1e-9);
    }
}
