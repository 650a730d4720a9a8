use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::{eyre, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use strategy_dashboard::{
    config::Config,
    loader::load_inputs,
    model::{ChartType, IndicatorKind},
    render::{export_animation, render_static, StaticChart},
    Dashboard,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the config file (defaults to ./dashboard.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the metrics card of every instrument
    Metrics,

    /// Draw the static comparison chart
    Chart(ChartArgs),

    /// Export the animation frames with fixed axes
    Animate(OutputArgs),

    /// Metrics, static chart and animation in one go
    Update(ChartArgs),
}

#[derive(Args)]
struct OutputArgs {
    /// Directory for generated files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args)]
struct ChartArgs {
    #[arg(long, value_enum)]
    chart_type: Option<ChartTypeArg>,

    /// Indicator overlay, may be repeated
    #[arg(long = "indicator", value_enum)]
    indicators: Vec<IndicatorArg>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Copy, Clone, ValueEnum)]
enum ChartTypeArg {
    Line,
    Candlestick,
}

#[derive(Copy, Clone, ValueEnum)]
enum IndicatorArg {
    Sma,
    Ema,
}

impl ChartArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(chart_type) = self.chart_type {
            config.chart.chart_type = match chart_type {
                ChartTypeArg::Line => ChartType::Line,
                ChartTypeArg::Candlestick => ChartType::Candlestick,
            };
        }

        if !self.indicators.is_empty() {
            config.chart.indicators = self
                .indicators
                .iter()
                .map(|i| match i {
                    IndicatorArg::Sma => IndicatorKind::Sma,
                    IndicatorArg::Ema => IndicatorKind::Ema,
                })
                .collect();
        }

        self.output.apply(config);
    }
}

impl OutputArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.general.output_dir = dir.clone();
        }
    }
}

fn print_metrics(dashboard: &Dashboard) {
    for card in dashboard.cards() {
        println!("{card}");
    }
}

fn chart(dashboard: &Dashboard, config: &Config) -> eyre::Result<()> {
    let selection = config.chart.selection();
    let traces = dashboard.traces(&selection);
    let series = dashboard.series();

    let path = render_static(
        &StaticChart {
            title: &config.general.title,
            traces: &traces,
            series: &series,
            settings: &config.chart,
        },
        &config.general.output_dir,
    )?;

    println!("static chart: {}", path.display());
    Ok(())
}

fn animate(dashboard: &Dashboard, config: &Config) -> eyre::Result<()> {
    let spec = dashboard
        .animation_spec(&config.animation, config.chart.log_y)
        .ok_or_else(|| eyre!("no data to animate"))?;
    let log = dashboard.animation();

    let path = export_animation(&config.general.title, &spec, &log, &config.general.output_dir)?;

    println!("animation ({} frames): {}", log.frame_count, path.display());
    Ok(())
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("strategy_dashboard=info".parse()?),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .wrap_err_with(|| format!("cannot load config {}", path.display()))?,
        None => Config::load_default()?,
    };

    match &cli.command {
        Commands::Chart(args) | Commands::Update(args) => args.apply(&mut config),
        Commands::Animate(args) => args.apply(&mut config),
        Commands::Metrics => {}
    }

    let raw = load_inputs(&config)?;
    let start = config
        .general
        .start
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| eyre!("invalid start date"))?;
    let dashboard = Dashboard::from_raw(&raw, start, config.general.step()?, config.general.window)?;

    info!(
        chart_type = %config.chart.chart_type,
        indicators = ?config.chart.indicators,
        "updating dashboard"
    );

    match cli.command {
        Commands::Metrics => print_metrics(&dashboard),
        Commands::Chart(_) => chart(&dashboard, &config)?,
        Commands::Animate(_) => animate(&dashboard, &config)?,
        Commands::Update(_) => {
            print_metrics(&dashboard);
            chart(&dashboard, &config)?;
            animate(&dashboard, &config)?;
        }
    }

    Ok(())
}
