//! Drawing the static chart and exporting the animation log.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use itertools::{Itertools, MinMaxResult};
use plotters::{coord::Shift, prelude::*, series::DashedLineSeries};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    chart::{AnimationSpec, LineStyle, TraceKind, TraceSpec},
    config::{ChartSettings, Color as TraceColor, ImageFormat},
    error::{Error, Result},
    model::{AnimationLog, FramePoint, IndicatorKind, PricePoint, Series},
};

pub struct StaticChart<'a> {
    pub title: &'a str,
    pub traces: &'a [TraceSpec],
    /// Indexed by `TraceSpec::instrument`.
    pub series: &'a [&'a Series],
    pub settings: &'a ChartSettings,
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn utc(ts: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(ts, Utc)
}

fn rgb(color: TraceColor) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

fn trace_values(trace: &TraceSpec, point: &PricePoint) -> Option<f64> {
    match trace.kind {
        TraceKind::Close | TraceKind::Candles => Some(point.close),
        TraceKind::Indicator(IndicatorKind::Sma) => point.sma,
        TraceKind::Indicator(IndicatorKind::Ema) => point.ema,
    }
}

impl StaticChart<'_> {
    fn points_of(&self, trace: &TraceSpec) -> Result<&Series> {
        self.series.get(trace.instrument).copied().ok_or_else(|| {
            Error::Render(format!("trace {} refers to a missing series", trace.name))
        })
    }

    fn x_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self
            .series
            .iter()
            .flat_map(|s| s.iter().map(|p| p.timestamp))
            .minmax()
        {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(t) => Some((utc(t), utc(t + Duration::days(1)))),
            MinMaxResult::MinMax(lo, hi) => Some((utc(lo), utc(hi))),
        }
    }

    fn y_range(&self) -> Result<Option<(f64, f64)>> {
        let mut values = vec![];
        for trace in self.traces {
            let series = self.points_of(trace)?;
            values.extend(series.iter().filter_map(|p| trace_values(trace, p)));
        }

        Ok(match values.into_iter().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((v, v)),
            MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
        })
    }
}

/// Draws the static comparison chart into `out_dir` and returns the file path.
pub fn render_static(chart: &StaticChart, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;

    let settings = chart.settings;
    let path = out_dir.join(format!("static.{}", settings.format.extension()));
    let size = (settings.width, settings.height);

    match settings.format {
        ImageFormat::Svg => draw_static(SVGBackend::new(&path, size).into_drawing_area(), chart)?,
        ImageFormat::Png => draw_static(BitMapBackend::new(&path, size).into_drawing_area(), chart)?,
    }

    info!(path = %path.display(), traces = chart.traces.len(), "static chart written");
    Ok(path)
}

fn draw_static<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, chart: &StaticChart) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;

    let (Some((x_min, x_max)), Some((min, max))) = (chart.x_range(), chart.y_range()?) else {
        return Err(Error::Render("nothing to draw".into()));
    };

    let padding = (max - min).max(1e-8) * 0.1;

    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(chart.title, ("sans-serif", 30.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60);

    if chart.settings.log_y && min > 0.0 {
        let y_min = (min - padding).max(min / 2.0);
        let mut ctx = builder
            .build_cartesian_2d(x_min..x_max, (y_min..max + padding).log_scale())
            .map_err(render_err)?;

        ctx.configure_mesh()
            .x_desc("Date")
            .y_desc("Price")
            .draw()
            .map_err(render_err)?;

        draw_traces(&mut ctx, chart)?;
    } else {
        if chart.settings.log_y {
            warn!(min, "non-positive values, falling back to a linear y axis");
        }

        let mut ctx = builder
            .build_cartesian_2d(x_min..x_max, min - padding..max + padding)
            .map_err(render_err)?;

        ctx.configure_mesh()
            .x_desc("Date")
            .y_desc("Price")
            .draw()
            .map_err(render_err)?;

        draw_traces(&mut ctx, chart)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_traces<'a, DB, X, Y>(
    ctx: &mut ChartContext<'a, DB, Cartesian2d<X, Y>>,
    chart: &StaticChart,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    X: Ranged<ValueType = DateTime<Utc>>,
    Y: Ranged<ValueType = f64>,
{
    for trace in chart.traces {
        let series = chart.points_of(trace)?;
        let color = rgb(trace.color);

        if trace.kind == TraceKind::Candles {
            ctx.draw_series(series.iter().map(|p| {
                CandleStick::new(
                    utc(p.timestamp),
                    p.open,
                    p.high,
                    p.low,
                    p.close,
                    color.filled(),
                    color.filled(),
                    5,
                )
            }))
            .map_err(render_err)?
            .label(&trace.name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            continue;
        }

        let points = series
            .iter()
            .filter_map(|p| trace_values(trace, p).map(|v| (utc(p.timestamp), v)))
            .collect_vec();
        let style = color.stroke_width(2);

        let anno = match trace.style {
            LineStyle::Solid => ctx.draw_series(LineSeries::new(points, style)),
            LineStyle::Dash => ctx.draw_series(DashedLineSeries::new(points, 10, 6, style)),
            LineStyle::Dot => ctx.draw_series(DashedLineSeries::new(points, 2, 4, style)),
        }
        .map_err(render_err)?;

        anno.label(&trace.name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    Ok(())
}

#[derive(Serialize)]
struct AnimationExport<'a> {
    title: &'a str,
    #[serde(flatten)]
    spec: &'a AnimationSpec,
    frame_count: usize,
    frames: &'a [FramePoint],
}

/// Writes the animation log with its fixed axes and playback timing as JSON.
///
/// Every frame repeats all earlier points, so the file grows quadratically
/// with the number of timestamps.
pub fn export_animation(
    title: &str,
    spec: &AnimationSpec,
    log: &AnimationLog,
    out_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;

    let path = out_dir.join("animation.json");
    let mut writer = BufWriter::new(File::create(&path)?);

    serde_json::to_writer(
        &mut writer,
        &AnimationExport {
            title,
            spec,
            frame_count: log.frame_count,
            frames: log.entries(),
        },
    )?;
    writer.flush()?;

    info!(
        path = %path.display(),
        frames = log.frame_count,
        entries = log.len(),
        "animation exported"
    );
    Ok(path)
}
