use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ScreenerError;

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes for one symbol, strictly ordered by date.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points that are already strictly ordered by date.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, ScreenerError> {
        let symbol = symbol.into();
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ScreenerError::InvalidData(format!(
                "{}: dates not strictly increasing ({} then {})",
                symbol, pair[0].date, pair[1].date
            )));
        }
        Ok(Self { symbol, points })
    }

    /// Normalize raw provider rows into a series.
    ///
    /// Rows with a non-finite or non-positive close are dropped, the rest are sorted
    /// by date, and when a date repeats the row that came last wins (providers append
    /// the live session after the final daily bar).
    pub fn from_points(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, ScreenerError> {
        let symbol = symbol.into();
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close.is_finite() && p.close > 0.0)
            .collect();

        if points.is_empty() {
            return Err(ScreenerError::DataUnavailable(format!(
                "{}: no valid close prices",
                symbol
            )));
        }

        // Stable sort keeps provider order within a date, so the last duplicate survives.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Ok(Self { symbol, points: deduped })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// EMA values aligned index-for-index with the `PriceSeries` they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaSeries {
    pub period: usize,
    pub values: Vec<f64>,
}

impl EmaSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Which side of the average the close sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn of(close: f64, ema: f64) -> Self {
        if close > ema {
            Direction::Above
        } else {
            Direction::Below
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetachmentState {
    /// Detachment at or below the threshold
    Touching,
    /// Detachment strictly above the threshold
    Detached,
}

impl DetachmentState {
    pub fn is_detached(&self) -> bool {
        matches!(self, DetachmentState::Detached)
    }
}

/// Evaluation of a single day against its EMA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetachmentResult {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub ema: f64,
    /// `|close - ema| / ema`
    pub ratio: f64,
    pub direction: Direction,
    pub state: DetachmentState,
}

impl DetachmentResult {
    /// Ratio expressed in percent, rounded to 4 decimal places.
    pub fn percent(&self) -> f64 {
        (self.ratio * 100.0 * 10_000.0).round() / 10_000.0
    }
}

/// An alert condition produced by the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trigger {
    /// Today is detached (absolute mode)
    Detached { today: DetachmentResult },
    /// Yesterday was touching and today is detached (transition mode)
    JustDetached {
        today: DetachmentResult,
        yesterday: DetachmentResult,
    },
}

impl Trigger {
    pub fn today(&self) -> &DetachmentResult {
        match self {
            Trigger::Detached { today } => today,
            Trigger::JustDetached { today, .. } => today,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.today().symbol
    }
}

/// When an alert fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvaluationMode {
    /// Every day the close is detached
    #[default]
    Absolute,
    /// Only on the day the close goes from touching to detached
    Transition,
}

impl FromStr for EvaluationMode {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(EvaluationMode::Absolute),
            "transition" => Ok(EvaluationMode::Transition),
            other => Err(ScreenerError::Config(format!(
                "unknown evaluation mode '{}' (expected 'absolute' or 'transition')",
                other
            ))),
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Absolute => f.write_str("absolute"),
            EvaluationMode::Transition => f.write_str("transition"),
        }
    }
}
