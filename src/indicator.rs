use crate::{
    error::{Error, Result},
    model::{Price, Series},
    utils::MovingAverage,
};

pub const DEFAULT_WINDOW: usize = 3;

/// Returns a copy of `series` with SMA and EMA of the close filled in.
///
/// Both columns stay `None` for the first `window - 1` points. The EMA is
/// seeded with the SMA of the first `window` closes and then follows
/// `ema = (close - prev) * 2 / (window + 1) + prev`.
pub fn augment(series: &Series, window: usize) -> Result<Series> {
    if window == 0 {
        return Err(Error::InvalidInput("indicator window must be positive".into()));
    }

    let closes = series.closes().collect::<Vec<_>>();
    let sma = sma(&closes, window);
    let ema = ema(&closes, window);

    let mut augmented = series.clone();
    for ((point, sma), ema) in augmented.points.iter_mut().zip(sma).zip(ema) {
        point.sma = sma;
        point.ema = ema;
    }

    Ok(augmented)
}

pub fn sma(values: &[Price], window: usize) -> Vec<Option<Price>> {
    let mut ma = MovingAverage::new(window);

    values
        .iter()
        .map(|&v| {
            ma.feed(v);
            ma.avg()
        })
        .collect()
}

/// SMA-seeded EMA. A recursive EMA seeded from the first close (pandas
/// `ewm(adjust=False)`) gives different early values: 97.5 instead of 100.0 at
/// index 2 for `[100, 110, 90]` with window 3.
pub fn ema(values: &[Price], window: usize) -> Vec<Option<Price>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    let multiplier = 2.0 / (window as Price + 1.0);
    let mut prev = values[..window].iter().sum::<Price>() / window as Price;
    result[window - 1] = Some(prev);

    for (ix, &value) in values.iter().enumerate().skip(window) {
        prev = (value - prev) * multiplier + prev;
        result[ix] = Some(prev);
    }

    result
}
