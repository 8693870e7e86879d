#[cfg(test)]
mod tests {
    use super::super::analyzer::*;
    use super::super::indicators::*;
    use analysis_core::{PriceBar, PriceSeries};
    use chrono::{Duration, TimeZone, Utc};

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        let result = sma(&data, 5);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_sma_real_prices() {
        let prices = sample_prices();
        let result = sma(&prices, 5);

        assert!(!result.is_empty());
        let expected_first = (44.34 + 44.09 + 44.15 + 43.61 + 44.33) / 5.0;
        assert!((result[0] - expected_first).abs() < 0.01);
    }

    #[test]
    fn test_rsi_aligned_with_input() {
        let prices = sample_prices();
        let result = rsi(&prices, 14);

        assert_eq!(result.len(), prices.len());
        assert!(result[..14].iter().all(|v| v.is_none()));
        assert!(result[14..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_rsi_bounded() {
        let prices = sample_prices();
        for value in rsi(&prices, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_matches_rolling_mean_definition() {
        let prices = sample_prices();
        let gains: f64 = prices[..15].windows(2).map(|w| (w[1] - w[0]).max(0.0)).sum();
        let losses: f64 = prices[..15].windows(2).map(|w| (w[0] - w[1]).max(0.0)).sum();
        let expected = 100.0 - 100.0 / (1.0 + (gains / 14.0) / (losses / 14.0));

        let result = rsi(&prices, 14);
        assert!((result[14].unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let data = vec![1.0, 2.0, 3.0];
        assert!(rsi(&data, 14).iter().all(|v| v.is_none()));
        assert_eq!(latest_rsi(&data, 14), None);

        // exactly window points is still one short
        let fourteen: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert_eq!(latest_rsi(&fourteen, 14), None);
    }

    #[test]
    fn test_rsi_all_gains_saturates_at_100() {
        let uptrend: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(latest_rsi(&uptrend, 14), Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses_is_zero() {
        let downtrend: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_eq!(latest_rsi(&downtrend, 14), Some(0.0));
    }

    #[test]
    fn test_moving_average_windowed() {
        let data: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let ma = moving_average(&data, 4).unwrap();

        assert_eq!(ma.kind, MovingAverageKind::Windowed);
        assert_eq!(ma.window, 4);
        assert!((ma.value - 8.5).abs() < 1e-9); // (7+8+9+10)/4
        assert_eq!(ma.label(), "SMA4");
    }

    #[test]
    fn test_moving_average_falls_back_to_period_average() {
        let data = vec![10.0, 20.0, 30.0];
        let ma = moving_average(&data, 200).unwrap();

        assert_eq!(ma.kind, MovingAverageKind::PeriodAverage);
        assert_eq!(ma.window, 3);
        assert!((ma.value - 20.0).abs() < 1e-9);
        assert_eq!(ma.label(), "period average");
    }

    #[test]
    fn test_moving_average_empty() {
        assert!(moving_average(&[], 50).is_none());
    }

    #[test]
    fn test_wma_weights_recent_values() {
        let result = wma(&[1.0, 2.0, 3.0, 6.0], 3);
        assert_eq!(result.len(), 2);
        assert!((result[0] - 14.0 / 6.0).abs() < 1e-9); // (1*1 + 2*2 + 3*3) / 6
        assert!((result[1] - 26.0 / 6.0).abs() < 1e-9); // (2*1 + 3*2 + 6*3) / 6
        assert!(result[1] > sma(&[2.0, 3.0, 6.0], 3)[0]);

        assert!(wma(&[1.0, 2.0], 3).is_empty());
        assert!(wma(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn test_weighted_moving_average_windowed() {
        let data: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let ma = weighted_moving_average(&data, 4).unwrap();

        assert_eq!(ma.kind, MovingAverageKind::Weighted);
        assert_eq!(ma.window, 4);
        assert!((ma.value - 9.0).abs() < 1e-9); // (7 + 16 + 27 + 40) / 10
        assert_eq!(ma.label(), "WMA4");
    }

    #[test]
    fn test_weighted_moving_average_fallback_and_empty() {
        let ma = weighted_moving_average(&[10.0, 20.0, 30.0], 50).unwrap();
        assert_eq!(ma.kind, MovingAverageKind::PeriodAverage);
        assert!((ma.value - 20.0).abs() < 1e-9);

        assert!(weighted_moving_average(&[], 50).is_none());
    }

    #[test]
    fn test_rsi_zone_bands() {
        assert_eq!(RsiZone::from_rsi(75.0), RsiZone::Overbought);
        assert_eq!(RsiZone::from_rsi(25.0), RsiZone::Oversold);
        assert_eq!(RsiZone::from_rsi(50.0), RsiZone::Neutral);
    }

    #[test]
    fn test_snapshot_short_history() {
        let engine = TechnicalAnalysisEngine::new();
        let snap = engine.snapshot(&series_from(&sample_prices()));

        assert_eq!(snap.last_close, Some(45.64));
        assert!(snap.rsi.is_some());
        assert!(!snap.insufficient_data);
        // 20 points: both trend windows degrade to the period average
        assert_eq!(snap.short_trend.unwrap().kind, MovingAverageKind::PeriodAverage);
        assert_eq!(snap.long_trend.unwrap().kind, MovingAverageKind::PeriodAverage);
    }

    #[test]
    fn test_snapshot_long_history_uses_windows() {
        let closes: Vec<f64> = (0..260).map(|i| 50.0 + i as f64 * 0.5).collect();
        let engine = TechnicalAnalysisEngine::new();
        let snap = engine.snapshot(&series_from(&closes));

        assert_eq!(snap.short_trend.unwrap().label(), "SMA50");
        assert_eq!(snap.long_trend.unwrap().label(), "SMA200");
        let weighted = snap.weighted_trend.unwrap();
        assert_eq!(weighted.label(), "WMA50");
        // rising closes: weighted average leads the simple one
        assert!(weighted.value > snap.short_trend.unwrap().value);
        assert_eq!(snap.above_long_trend(), Some(true));
        assert_eq!(snap.rsi_zone, Some(RsiZone::Overbought));
    }

    #[test]
    fn test_snapshot_empty_and_single_point() {
        let engine = TechnicalAnalysisEngine::new();

        let empty = engine.snapshot(&PriceSeries::empty());
        assert!(empty.insufficient_data);
        assert_eq!(empty.last_close, None);
        assert_eq!(empty.above_long_trend(), None);

        let single = engine.snapshot(&series_from(&[42.0]));
        assert!(single.insufficient_data);
        assert_eq!(single.rsi, None);
        // close equals its own average, so not above trend
        assert_eq!(single.above_long_trend(), Some(false));
    }
}
