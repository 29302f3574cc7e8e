use screener_core::Trigger;

pub struct AlertTemplate;

impl AlertTemplate {
    /// Render the one-line alert text for a trigger.
    ///
    /// `period` is the EMA span and appears in the text as e.g. "the 200 EMA" and
    /// "EMA200".
    pub fn render(trigger: &Trigger, period: usize) -> String {
        match trigger {
            Trigger::Detached { today } => format!(
                "{} is {} the {} EMA by {}% (Close: {:.2}, EMA{}: {:.2})",
                today.symbol,
                today.direction,
                period,
                format_percent(today.percent()),
                today.close,
                period,
                today.ema,
            ),
            Trigger::JustDetached { today, yesterday } => format!(
                "{} JUST DETACHED {} the {} EMA by {}% (Today: {:.2}, EMA{}: {:.2}, Yesterday: {:.2}, Yest EMA{}: {:.2})",
                today.symbol,
                today.direction,
                period,
                format_percent(today.percent()),
                today.close,
                period,
                today.ema,
                yesterday.close,
                period,
                yesterday.ema,
            ),
        }
    }
}

/// Shortest decimal form of a percentage, always with a fractional part
/// (`10.0`, `0.02`, `3.1416`).
pub fn format_percent(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}
