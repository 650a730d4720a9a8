use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{Price, PricePoint, Series},
};

/// Builds a flat-OHLC series, one point per price, spaced `step` apart from
/// `start`.
pub fn build(prices: &[Price], label: &str, start: NaiveDateTime, step: Duration) -> Result<Series> {
    if prices.is_empty() {
        return Err(Error::InvalidInput(format!("no prices for {label}")));
    }

    if step <= Duration::zero() {
        return Err(Error::InvalidInput(format!("step must be positive, got {step}")));
    }

    if let Some(ix) = prices.iter().position(|p| !p.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "non-finite price at index {ix} for {label}"
        )));
    }

    let mut points = Vec::with_capacity(prices.len());
    let mut timestamp = start;

    for (ix, &price) in prices.iter().enumerate() {
        if ix > 0 {
            timestamp = timestamp.checked_add_signed(step).ok_or_else(|| {
                Error::InvalidInput(format!("timestamp overflow at index {ix} for {label}"))
            })?;
        }

        points.push(PricePoint::flat(timestamp, price, label));
    }

    debug!(label, len = points.len(), "built series");

    Ok(Series {
        label: label.to_owned(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use itertools::Itertools;

    use super::build;
    use crate::error::Error;

    fn jan_first() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn unittest_build_flat_series() -> eyre::Result<()> {
        let series = build(&[100.0, 110.0, 90.0], "Our Strategy", jan_first(), Duration::days(1))?;

        assert_eq!(series.len(), 3);
        assert_eq!(series.label, "Our Strategy");

        for p in series.iter() {
            assert_eq!(p.open, p.close);
            assert_eq!(p.high, p.close);
            assert_eq!(p.low, p.close);
            assert_eq!(p.volume, 1000);
            assert_eq!(p.instrument, "Our Strategy");
            assert!(p.sma.is_none() && p.ema.is_none());
        }

        assert!(series
            .iter()
            .tuple_windows()
            .all(|(prev, next)| prev.timestamp < next.timestamp));

        let days = series
            .iter()
            .map(|p| p.timestamp.date().to_string())
            .collect_vec();
        assert_eq!(days, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);

        Ok(())
    }

    #[test]
    fn unittest_build_sub_day_step() -> eyre::Result<()> {
        let series = build(&[1.0, 2.0], "A", jan_first(), Duration::hours(6))?;
        assert_eq!(series[1].timestamp - series[0].timestamp, Duration::hours(6));
        Ok(())
    }

    #[test]
    fn unittest_build_rejects_invalid_input() {
        assert!(matches!(
            build(&[], "A", jan_first(), Duration::days(1)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            build(&[1.0], "A", jan_first(), Duration::zero()),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            build(&[1.0], "A", jan_first(), Duration::days(-1)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            build(&[1.0, f64::NAN], "A", jan_first(), Duration::days(1)),
            Err(Error::InvalidInput(_))
        ));
    }
}
