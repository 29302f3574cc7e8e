use screener_core::{EmaSeries, PriceSeries};

/// Default EMA span
pub const DEFAULT_EMA_PERIOD: usize = 200;

/// Smoothing factor for an EMA span: `2 / (period + 1)`
pub fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Exponential Moving Average
///
/// Pure recursive form: the first value seeds the average and every later value is
/// `data[i] * alpha + prev * (1 - alpha)`. No re-normalization of early terms, so a
/// series shorter than `period` still produces one value per input.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let alpha = ema_alpha(period);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let ema_val = data[i] * alpha + result[i - 1] * (1.0 - alpha);
        result.push(ema_val);
    }

    result
}

/// EMA over a series' closes, aligned index-for-index with its points
pub fn ema_series(series: &PriceSeries, period: usize) -> EmaSeries {
    EmaSeries {
        period,
        values: ema(&series.closes(), period),
    }
}
