//! Pure chart configuration: which traces to draw and how to play frames back.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::{
    config::{AnimationSettings, Color},
    model::{ChartType, CombinedSeries, IndicatorKind},
};

/// Selection made on the dashboard before an update.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    pub chart_type: ChartType,
    pub indicators: BTreeSet<IndicatorKind>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dash,
    Dot,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TraceKind {
    Close,
    Indicator(IndicatorKind),
    Candles,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSpec {
    pub name: String,
    /// Index into the instrument list the trace was built from.
    pub instrument: usize,
    pub kind: TraceKind,
    pub color: Color,
    pub style: LineStyle,
}

/// Traces for the static chart, in drawing order.
///
/// Line charts get one close line per instrument followed by the selected
/// indicator overlays. Candlestick charts ignore indicators.
pub fn traces(config: &ChartConfig, instruments: &[(&str, Color)]) -> Vec<TraceSpec> {
    match config.chart_type {
        ChartType::Line => {
            let closes = instruments
                .iter()
                .enumerate()
                .map(|(ix, (label, color))| TraceSpec {
                    name: label.to_string(),
                    instrument: ix,
                    kind: TraceKind::Close,
                    color: *color,
                    style: LineStyle::Solid,
                });

            let overlays = config.indicators.iter().flat_map(|indicator| {
                let style = match indicator {
                    IndicatorKind::Sma => LineStyle::Dash,
                    IndicatorKind::Ema => LineStyle::Dot,
                };

                instruments
                    .iter()
                    .enumerate()
                    .map(move |(ix, (label, color))| TraceSpec {
                        name: format!("{indicator} ({label})"),
                        instrument: ix,
                        kind: TraceKind::Indicator(*indicator),
                        color: *color,
                        style,
                    })
            });

            closes.chain(overlays).collect()
        }
        ChartType::Candlestick => instruments
            .iter()
            .enumerate()
            .map(|(ix, (label, color))| TraceSpec {
                name: label.to_string(),
                instrument: ix,
                kind: TraceKind::Candles,
                color: *color,
                style: LineStyle::Solid,
            })
            .collect(),
    }
}

/// Fixed axes and timing for animated playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationSpec {
    pub x_range: (NaiveDateTime, NaiveDateTime),
    pub y_range: (f64, f64),
    pub frame_duration_ms: u64,
    pub transition_ms: u64,
    pub log_y: bool,
}

/// Axis bounds stay fixed over the whole playback so the chart does not jump.
/// `None` for an empty series.
pub fn animation_spec(
    combined: &CombinedSeries,
    settings: &AnimationSettings,
    log_y: bool,
) -> Option<AnimationSpec> {
    let x_range = match combined.iter().map(|p| p.timestamp).minmax() {
        MinMaxResult::NoElements => return None,
        MinMaxResult::OneElement(t) => (t, t),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };

    let (y_min, y_max) = match combined
        .iter()
        .map(|p| p.close)
        .minmax_by(|a, b| a.total_cmp(b))
    {
        MinMaxResult::NoElements => return None,
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };

    Some(AnimationSpec {
        x_range,
        y_range: (y_min - settings.y_padding, y_max + settings.y_padding),
        frame_duration_ms: settings.frame_duration_ms,
        transition_ms: settings.transition_ms,
        log_y,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::builder::build;

    const PAIR: [(&str, Color); 2] = [("Our Strategy", Color::Blue), ("SP500", Color::Red)];

    #[test]
    fn unittest_line_traces_without_indicators() {
        let specs = traces(&ChartConfig::default(), &PAIR);

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "Our Strategy");
        assert_eq!(specs[0].color, Color::Blue);
        assert_eq!(specs[1].name, "SP500");
        assert!(specs.iter().all(|s| s.style == LineStyle::Solid));
    }

    #[test]
    fn unittest_line_traces_with_indicators() {
        let config = ChartConfig {
            chart_type: ChartType::Line,
            indicators: BTreeSet::from([IndicatorKind::Ema, IndicatorKind::Sma]),
        };
        let specs = traces(&config, &PAIR);
        let names = specs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();

        assert_eq!(
            names,
            vec![
                "Our Strategy",
                "SP500",
                "SMA_20 (Our Strategy)",
                "SMA_20 (SP500)",
                "EMA_20 (Our Strategy)",
                "EMA_20 (SP500)",
            ]
        );
        assert_eq!(specs[2].style, LineStyle::Dash);
        assert_eq!(specs[3].color, Color::Red);
        assert_eq!(specs[4].style, LineStyle::Dot);
        assert_eq!(specs[5].kind, TraceKind::Indicator(IndicatorKind::Ema));
    }

    #[test]
    fn unittest_candlestick_ignores_indicators() {
        let config = ChartConfig {
            chart_type: ChartType::Candlestick,
            indicators: BTreeSet::from([IndicatorKind::Sma]),
        };
        let specs = traces(&config, &PAIR);

        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|s| s.kind == TraceKind::Candles));
    }

    #[test]
    fn unittest_animation_spec_bounds() -> eyre::Result<()> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let a = build(&[100.0, 110.0, 90.0], "A", start, Duration::days(1))?;
        let b = build(&[1000.0, 1200.0], "B", start, Duration::days(1))?;
        let combined = CombinedSeries::merge([&a, &b]);

        let spec = animation_spec(&combined, &AnimationSettings::default(), true)
            .expect("non-empty");

        assert_eq!(spec.x_range, (start, start + Duration::days(2)));
        assert_eq!(spec.y_range, (40.0, 1250.0));
        assert_eq!(spec.frame_duration_ms, 50);
        assert_eq!(spec.transition_ms, 30);

        assert!(animation_spec(&CombinedSeries::default(), &AnimationSettings::default(), true).is_none());

        Ok(())
    }
}
