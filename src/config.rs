//! Dashboard configuration.
//!
//! Loaded from a TOML file; every section falls back to defaults so a partial
//! file (or none at all) is enough to run.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    chart::ChartConfig,
    indicator::DEFAULT_WINDOW,
    metrics::QuotedRatios,
    model::{ChartType, IndicatorKind},
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid step '{0}'. Examples: 30m, 6h, 1d, 1w")]
    InvalidStep(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub instruments: Vec<InstrumentConfig>,
    pub chart: ChartSettings,
    pub animation: AnimationSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            instruments: vec![
                InstrumentConfig::synthetic("Our Strategy", Color::Blue, 7),
                InstrumentConfig::synthetic("SP500", Color::Red, 42),
            ],
            chart: ChartSettings::default(),
            animation: AnimationSettings::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// `./dashboard.toml` when present, otherwise defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("dashboard.toml")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub title: String,
    /// Timestamp of the first point of every series.
    pub start: NaiveDate,
    /// Spacing between points, e.g. "1d" or "6h".
    pub step: String,
    /// SMA/EMA window.
    pub window: usize,
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: "Our Strategy vs. SP500".to_string(),
            start: NaiveDate::from_ymd_opt(2006, 3, 1).unwrap_or_default(),
            step: "1d".to_string(),
            window: DEFAULT_WINDOW,
            output_dir: PathBuf::from("out"),
        }
    }
}

impl GeneralConfig {
    pub fn step(&self) -> Result<Duration, ConfigError> {
        parse_step(&self.step)
    }
}

/// Parses "<amount><unit>" with unit one of m, h, d, w.
pub fn parse_step(step: &str) -> Result<Duration, ConfigError> {
    let step = step.trim().to_lowercase();
    let split_idx = step.chars().take_while(|c| c.is_ascii_digit()).count();

    if split_idx == 0 || split_idx == step.len() {
        return Err(ConfigError::InvalidStep(step));
    }

    let amount: i64 = step[..split_idx]
        .parse()
        .map_err(|_| ConfigError::InvalidStep(step.clone()))?;

    let duration = match &step[split_idx..] {
        "m" | "min" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => None,
    };

    duration.ok_or(ConfigError::InvalidStep(step))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Blue,
    Red,
    Green,
    Orange,
    Purple,
    Black,
}

impl Color {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Blue => (0, 0, 255),
            Color::Red => (255, 0, 0),
            Color::Green => (0, 160, 0),
            Color::Orange => (255, 153, 51),
            Color::Purple => (128, 0, 128),
            Color::Black => (0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub label: String,
    pub color: Color,
    pub source: SourceConfig,
    /// Keep every n-th value of the source.
    #[serde(default = "default_stride")]
    pub stride: usize,
    /// Ratios shown on the card as quoted figures; never fed into `Metrics`.
    #[serde(default)]
    pub quoted_sharpe: Option<f64>,
    #[serde(default)]
    pub quoted_sortino: Option<f64>,
}

fn default_stride() -> usize {
    1
}

impl InstrumentConfig {
    fn synthetic(label: &str, color: Color, seed: u64) -> Self {
        Self {
            label: label.to_string(),
            color,
            source: SourceConfig::Synthetic {
                seed,
                len: 500,
                start_price: 1000.0,
                volatility: 0.01,
            },
            stride: 1,
            quoted_sharpe: None,
            quoted_sortino: None,
        }
    }

    pub fn quoted(&self) -> QuotedRatios {
        QuotedRatios {
            sharpe: self.quoted_sharpe,
            sortino: self.quoted_sortino,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// One column of a CSV file, selected by header.
    Csv {
        path: PathBuf,
        column: String,
        /// Data rows skipped before the series starts.
        #[serde(default)]
        skip: usize,
        /// Scale the series so that its first value equals this.
        #[serde(default)]
        rebase: Option<f64>,
    },
    /// A JSON array of numbers.
    Json { path: PathBuf },
    /// Seeded random walk.
    Synthetic {
        seed: u64,
        len: usize,
        start_price: f64,
        volatility: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub chart_type: ChartType,
    pub indicators: BTreeSet<IndicatorKind>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub log_y: bool,
}

impl ChartSettings {
    pub fn selection(&self) -> ChartConfig {
        ChartConfig {
            chart_type: self.chart_type,
            indicators: self.indicators.clone(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            indicators: BTreeSet::new(),
            format: ImageFormat::Svg,
            width: 1200,
            height: 500,
            log_y: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub frame_duration_ms: u64,
    pub transition_ms: u64,
    /// Added below the lowest and above the highest close.
    pub y_padding: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            frame_duration_ms: 50,
            transition_ms: 30,
            y_padding: 50.0,
        }
    }
}
