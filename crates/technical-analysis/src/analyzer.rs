use screener_core::{EvaluationMode, PriceSeries, ScreenerError, Trigger};

use crate::detachment::*;
use crate::indicators::*;
use crate::transition::*;

/// Runs the EMA and detachment checks for one symbol's series.
#[derive(Debug, Clone, Copy)]
pub struct DetachmentAnalyzer {
    period: usize,
    threshold: f64,
    mode: EvaluationMode,
}

impl DetachmentAnalyzer {
    pub fn new(period: usize, threshold: f64, mode: EvaluationMode) -> Self {
        Self {
            period,
            threshold,
            mode,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Evaluate the latest day of `series`.
    ///
    /// `Ok(None)` means nothing to alert on. `Err(InvalidValue)` means today's close or
    /// EMA could not be evaluated and the symbol should be skipped.
    pub fn analyze(&self, series: &PriceSeries) -> Result<Option<Trigger>, ScreenerError> {
        let points = series.points();
        if points.is_empty() {
            return Err(ScreenerError::InvalidValue(format!(
                "{}: empty price series",
                series.symbol()
            )));
        }

        if self.period == 0 {
            return Err(ScreenerError::InvalidValue(format!(
                "{}: EMA period must be positive",
                series.symbol()
            )));
        }

        let emas = ema_series(series, self.period);
        let last = points.len() - 1;
        let today = evaluate_day(
            series.symbol(),
            points[last].date,
            points[last].close,
            ema_at(&emas.values, last, series.symbol())?,
            self.threshold,
        )?;

        tracing::debug!(
            "{} {}: close={:.2} ema{}={:.2} detachment={:.6} ({} bars)",
            today.symbol,
            today.date,
            today.close,
            self.period,
            today.ema,
            today.ratio,
            points.len()
        );

        match self.mode {
            EvaluationMode::Absolute => {
                if today.state.is_detached() {
                    Ok(Some(Trigger::Detached { today }))
                } else {
                    Ok(None)
                }
            }
            EvaluationMode::Transition => {
                if last == 0 {
                    tracing::debug!("{}: need 2 days for transition check", today.symbol);
                    return Ok(None);
                }

                let yesterday = match ema_at(&emas.values, last - 1, series.symbol())
                    .and_then(|ema| {
                        evaluate_day(
                            series.symbol(),
                            points[last - 1].date,
                            points[last - 1].close,
                            ema,
                            self.threshold,
                        )
                    }) {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::debug!("{}: previous day not usable: {}", today.symbol, e);
                        return Ok(None);
                    }
                };

                if just_detached(&yesterday, &today) {
                    Ok(Some(Trigger::JustDetached { today, yesterday }))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

fn ema_at(values: &[f64], index: usize, symbol: &str) -> Result<f64, ScreenerError> {
    values.get(index).copied().ok_or_else(|| {
        ScreenerError::InvalidValue(format!("{}: no EMA value for bar {}", symbol, index))
    })
}

impl Default for DetachmentAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_EMA_PERIOD, DEFAULT_DETACH_THRESHOLD, EvaluationMode::Absolute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use screener_core::{Direction, PricePoint};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close))
            .collect();
        PriceSeries::new("TEST", points).unwrap()
    }

    // A long flat history pins the 200 EMA near 100, so the last closes set the detachment.
    fn analyzer(mode: EvaluationMode) -> DetachmentAnalyzer {
        DetachmentAnalyzer::new(DEFAULT_EMA_PERIOD, DEFAULT_DETACH_THRESHOLD, mode)
    }

    #[test]
    fn test_absolute_fires_when_detached() {
        // Flat at 100 then a jump: EMA barely moves, close is far above it.
        let mut closes = vec![100.0; 250];
        closes.push(110.0);
        let trigger = analyzer(EvaluationMode::Absolute)
            .analyze(&series(&closes))
            .unwrap()
            .expect("should trigger");

        match trigger {
            Trigger::Detached { today } => {
                assert_eq!(today.direction, Direction::Above);
                assert!(today.ratio > 0.09);
            }
            other => panic!("unexpected trigger {:?}", other),
        }
    }

    #[test]
    fn test_absolute_quiet_when_touching() {
        let closes = vec![100.0; 250];
        let result = analyzer(EvaluationMode::Absolute).analyze(&series(&closes)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_absolute_repeats_while_detached() {
        // Yesterday already detached; absolute mode still fires today.
        let mut closes = vec![100.0; 250];
        closes.push(110.0);
        closes.push(111.0);
        let result = analyzer(EvaluationMode::Absolute).analyze(&series(&closes)).unwrap();
        assert!(matches!(result, Some(Trigger::Detached { .. })));
    }

    #[test]
    fn test_transition_fires_on_rising_edge() {
        let mut closes = vec![100.0; 250];
        closes.push(110.0);
        let result = analyzer(EvaluationMode::Transition).analyze(&series(&closes)).unwrap();

        match result {
            Some(Trigger::JustDetached { today, yesterday }) => {
                assert!(today.state.is_detached());
                assert!(!yesterday.state.is_detached());
                assert_eq!(today.direction, Direction::Above);
            }
            other => panic!("expected JustDetached, got {:?}", other),
        }
    }

    #[test]
    fn test_transition_quiet_when_already_detached() {
        let mut closes = vec![100.0; 250];
        closes.push(110.0);
        closes.push(111.0);
        let result = analyzer(EvaluationMode::Transition).analyze(&series(&closes)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_transition_quiet_when_today_touching() {
        let closes = vec![100.0; 250];
        let result = analyzer(EvaluationMode::Transition).analyze(&series(&closes)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_transition_single_day_is_skipped() {
        let result = analyzer(EvaluationMode::Transition).analyze(&series(&[100.0])).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_single_day_absolute_is_touching() {
        // EMA seeds with the only close, so detachment is zero.
        let result = analyzer(EvaluationMode::Absolute).analyze(&series(&[100.0])).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_empty_series_is_invalid() {
        let empty = PriceSeries::new("EMPTY", vec![]).unwrap();
        let err = analyzer(EvaluationMode::Absolute).analyze(&empty).unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidValue(_)));
    }

    #[test]
    fn test_nan_close_is_invalid() {
        let mut closes = vec![100.0; 10];
        closes.push(f64::NAN);
        let err = analyzer(EvaluationMode::Absolute).analyze(&series(&closes)).unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidValue(_)));
    }

    #[test]
    fn test_zero_period_is_invalid() {
        for mode in [EvaluationMode::Absolute, EvaluationMode::Transition] {
            let err = DetachmentAnalyzer::new(0, DEFAULT_DETACH_THRESHOLD, mode)
                .analyze(&series(&[100.0, 101.0]))
                .unwrap_err();
            assert!(matches!(err, ScreenerError::InvalidValue(_)));
        }
    }

    #[test]
    fn test_ema_at_out_of_range() {
        assert_eq!(ema_at(&[100.0], 0, "TEST").unwrap(), 100.0);
        assert!(matches!(ema_at(&[], 0, "TEST"), Err(ScreenerError::InvalidValue(_))));
    }
}
