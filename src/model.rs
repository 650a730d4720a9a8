use chrono::NaiveDateTime;
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};

pub type Price = f64;

/// Placeholder volume carried by every generated point.
pub const FLAT_VOLUME: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: usize,
    pub instrument: String,
    /// Filled in by `indicator::augment`.
    pub sma: Option<Price>,
    pub ema: Option<Price>,
}

impl PricePoint {
    pub fn flat(timestamp: NaiveDateTime, price: Price, instrument: &str) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: FLAT_VOLUME,
            instrument: instrument.to_owned(),
            sma: None,
            ema: None,
        }
    }
}

/// Points of a single instrument, ascending by timestamp with no duplicates.
#[derive(Default, Debug, Clone, PartialEq, Deref, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    #[deref]
    pub(crate) points: Vec<PricePoint>,
}

impl Series {
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = Price> + '_ {
        self.points.iter().map(|p| p.close)
    }
}

/// Several series merged and stably sorted by timestamp. Timestamps may repeat
/// across instruments.
///
/// Serialized as a plain array of points. Every way in, deserialization
/// included, goes through the sort.
#[derive(Default, Debug, Clone, PartialEq, Deref, Serialize, Deserialize)]
#[serde(from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct CombinedSeries {
    points: Vec<PricePoint>,
}

impl From<Vec<PricePoint>> for CombinedSeries {
    fn from(mut points: Vec<PricePoint>) -> Self {
        // stable: ties keep input order
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }
}

impl From<CombinedSeries> for Vec<PricePoint> {
    fn from(combined: CombinedSeries) -> Self {
        combined.points
    }
}

impl CombinedSeries {
    pub fn merge<'a>(series: impl IntoIterator<Item = &'a Series>) -> Self {
        series
            .into_iter()
            .flat_map(|s| s.points.iter().cloned())
            .collect::<Vec<_>>()
            .into()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePoint {
    pub frame: usize,
    #[serde(flatten)]
    pub point: PricePoint,
}

/// Every frame of a growing-prefix animation, concatenated in frame order.
#[derive(Default, Debug, Clone, PartialEq, Deref, Serialize, Deserialize)]
pub struct AnimationLog {
    pub frame_count: usize,
    #[deref]
    pub(crate) entries: Vec<FramePoint>,
}

impl AnimationLog {
    pub fn entries(&self) -> &[FramePoint] {
        &self.entries
    }

    /// Points of frame `id`, or an empty slice when out of range.
    pub fn frame(&self, id: usize) -> &[FramePoint] {
        let start = self.entries.partition_point(|e| e.frame < id);
        let end = self.entries.partition_point(|e| e.frame <= id);
        &self.entries[start..end]
    }

    pub fn frame_sizes(&self) -> Vec<usize> {
        (0..self.frame_count).map(|id| self.frame(id).len()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub first: Price,
    pub last: Price,
    pub change: Price,
    pub pct_change: f64,
    pub max: Price,
    pub min: Price,
    /// Not derived from data; always `None` from `metrics::summarize`.
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    #[display(fmt = "Line")]
    Line,
    #[display(fmt = "Candlestick")]
    Candlestick,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    #[display(fmt = "SMA_20")]
    Sma,
    #[display(fmt = "EMA_20")]
    Ema,
}
