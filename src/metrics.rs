use std::fmt;

use crate::{
    error::{Error, Result},
    model::{Metrics, Series},
};

/// Summary statistics over one series. `Ok(None)` for an empty series.
pub fn summarize(series: &Series) -> Result<Option<Metrics>> {
    let (Some(head), Some(tail)) = (series.first(), series.last()) else {
        return Ok(None);
    };

    let first = head.close;
    let last = tail.close;
    let change = last - first;

    if first == 0.0 {
        return Err(Error::DivisionByZero(format!(
            "first close of {} is zero",
            series.label
        )));
    }

    let max = series
        .iter()
        .map(|p| p.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let min = series.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);

    Ok(Some(Metrics {
        first,
        last,
        change,
        pct_change: change / first * 100.0,
        max,
        min,
        sharpe: None,
        sortino: None,
    }))
}

/// Ratio values shown next to the metrics without being computed from data.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct QuotedRatios {
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
}

/// Dashboard card: starting capital, current capital with change, ratios.
pub struct MetricsCard<'a> {
    pub label: &'a str,
    pub metrics: &'a Metrics,
    pub quoted: QuotedRatios,
}

fn ratio(computed: Option<f64>, quoted: Option<f64>) -> String {
    match (computed, quoted) {
        (Some(v), _) => format!("{v:.2}"),
        (None, Some(v)) => format!("{v:.2} (quoted)"),
        (None, None) => "n/a".to_owned(),
    }
}

impl fmt::Display for MetricsCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.metrics;
        writeln!(f, "{} - Starting Capital: {:.2}", self.label, m.first)?;
        writeln!(
            f,
            "  Current Capital: {:.2} {:.2} ({:.2}%)",
            m.last, m.change, m.pct_change
        )?;
        writeln!(f, "  High / Low: {:.2} / {:.2}", m.max, m.min)?;
        writeln!(f, "  Sharpe Ratio: {}", ratio(m.sharpe, self.quoted.sharpe))?;
        write!(f, "  Sortino Ratio: {}", ratio(m.sortino, self.quoted.sortino))
    }
}
