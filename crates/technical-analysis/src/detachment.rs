use chrono::NaiveDate;
use screener_core::{DetachmentResult, DetachmentState, Direction, ScreenerError};

/// Default detachment threshold: 0.01%
pub const DEFAULT_DETACH_THRESHOLD: f64 = 0.0001;

/// Relative distance of a close from its EMA: `|close - ema| / ema`.
///
/// Returns `None` when the inputs cannot be evaluated: a non-finite close, or an EMA
/// that is non-finite, zero or negative.
pub fn detachment(close: f64, ema: f64) -> Option<f64> {
    if !close.is_finite() || !ema.is_finite() || ema <= 0.0 {
        return None;
    }
    Some((close - ema).abs() / ema)
}

/// `Touching` at or below the threshold, `Detached` strictly above it
pub fn classify(ratio: f64, threshold: f64) -> DetachmentState {
    if ratio > threshold {
        DetachmentState::Detached
    } else {
        DetachmentState::Touching
    }
}

/// Evaluate one day's close against its EMA.
pub fn evaluate_day(
    symbol: &str,
    date: NaiveDate,
    close: f64,
    ema: f64,
    threshold: f64,
) -> Result<DetachmentResult, ScreenerError> {
    let ratio = detachment(close, ema).ok_or_else(|| {
        ScreenerError::InvalidValue(format!(
            "{} on {}: cannot evaluate close {} against EMA {}",
            symbol, date, close, ema
        ))
    })?;

    Ok(DetachmentResult {
        symbol: symbol.to_string(),
        date,
        close,
        ema,
        ratio,
        direction: Direction::of(close, ema),
        state: classify(ratio, threshold),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn test_detachment_ten_percent() {
        let ratio = detachment(110.0, 100.0).unwrap();
        assert!((ratio - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_detachment_non_negative_below_ema() {
        let ratio = detachment(90.0, 100.0).unwrap();
        assert!(ratio >= 0.0);
        assert!((ratio - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_detachment_self_consistent() {
        let cases = [(110.0, 100.0), (87.5, 93.25), (100.005, 100.0), (0.5, 2.0)];
        for (close, ema) in cases {
            let direct = detachment(close, ema).unwrap();
            let rebuilt = detachment(ema + (close - ema), ema).unwrap();
            assert!(direct >= 0.0);
            assert!((direct - rebuilt).abs() < 1e-12);
        }
    }

    #[test]
    fn test_detachment_invalid_inputs() {
        assert!(detachment(100.0, 0.0).is_none());
        assert!(detachment(0.0, 0.0).is_none());
        assert!(detachment(100.0, f64::NAN).is_none());
        assert!(detachment(f64::NAN, 100.0).is_none());
        assert!(detachment(100.0, f64::INFINITY).is_none());
        assert!(detachment(100.0, -5.0).is_none());
    }

    #[test]
    fn test_classify_threshold_boundary() {
        let threshold = DEFAULT_DETACH_THRESHOLD;
        assert_eq!(classify(threshold, threshold), DetachmentState::Touching);
        assert_eq!(classify(threshold + 1e-12, threshold), DetachmentState::Detached);
        assert_eq!(classify(0.0, threshold), DetachmentState::Touching);
    }

    #[test]
    fn test_evaluate_day_detached_above() {
        let result = evaluate_day("AAPL", today(), 110.0, 100.0, DEFAULT_DETACH_THRESHOLD).unwrap();
        assert_eq!(result.state, DetachmentState::Detached);
        assert_eq!(result.direction, Direction::Above);
        assert!((result.percent() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_day_touching() {
        // 0.005% is under the 0.01% threshold
        let result = evaluate_day("AAPL", today(), 100.005, 100.0, DEFAULT_DETACH_THRESHOLD).unwrap();
        assert_eq!(result.state, DetachmentState::Touching);
    }

    #[test]
    fn test_evaluate_day_detached_below() {
        let result = evaluate_day("XOM", today(), 95.0, 100.0, DEFAULT_DETACH_THRESHOLD).unwrap();
        assert_eq!(result.state, DetachmentState::Detached);
        assert_eq!(result.direction, Direction::Below);
    }

    #[test]
    fn test_evaluate_day_zero_ema_is_invalid() {
        let err = evaluate_day("AAPL", today(), 100.0, 0.0, DEFAULT_DETACH_THRESHOLD).unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidValue(_)));
    }

    #[test]
    fn test_evaluate_day_nan_is_invalid() {
        let err = evaluate_day("AAPL", today(), f64::NAN, 100.0, DEFAULT_DETACH_THRESHOLD).unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidValue(_)));
    }
}
