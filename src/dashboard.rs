use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::{
    builder,
    chart::{self, AnimationSpec, ChartConfig, TraceSpec},
    config::{AnimationSettings, InstrumentConfig},
    error::Result,
    frames, indicator,
    loader::RawData,
    metrics::{self, MetricsCard},
    model::{AnimationLog, CombinedSeries, Metrics, Series},
};

/// One instrument after building, augmenting and summarizing.
#[derive(Debug, Clone)]
pub struct InstrumentView {
    pub config: InstrumentConfig,
    pub series: Series,
    pub metrics: Option<Metrics>,
}

/// Everything the rendering side needs, derived from loaded inputs.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub instruments: Vec<InstrumentView>,
    pub combined: CombinedSeries,
}

impl Dashboard {
    pub fn from_raw(
        raw: &RawData,
        start: NaiveDateTime,
        step: Duration,
        window: usize,
    ) -> Result<Self> {
        let mut instruments = Vec::with_capacity(raw.instruments.len());

        for instrument in &raw.instruments {
            let series = builder::build(&instrument.prices, &instrument.config.label, start, step)?;
            let series = indicator::augment(&series, window)?;
            let metrics = metrics::summarize(&series)?;

            instruments.push(InstrumentView {
                config: instrument.config.clone(),
                series,
                metrics,
            });
        }

        let combined = CombinedSeries::merge(instruments.iter().map(|i| &i.series));
        info!(
            instruments = instruments.len(),
            points = combined.len(),
            "dashboard ready"
        );

        Ok(Self {
            instruments,
            combined,
        })
    }

    pub fn series(&self) -> Vec<&Series> {
        self.instruments.iter().map(|i| &i.series).collect()
    }

    pub fn cards(&self) -> impl Iterator<Item = MetricsCard<'_>> {
        self.instruments.iter().filter_map(|i| {
            i.metrics.as_ref().map(|metrics| MetricsCard {
                label: &i.config.label,
                metrics,
                quoted: i.config.quoted(),
            })
        })
    }

    pub fn traces(&self, config: &ChartConfig) -> Vec<TraceSpec> {
        let instruments = self
            .instruments
            .iter()
            .map(|i| (i.config.label.as_str(), i.config.color))
            .collect::<Vec<_>>();

        chart::traces(config, &instruments)
    }

    pub fn animation(&self) -> AnimationLog {
        frames::expand(&self.combined)
    }

    pub fn animation_spec(&self, settings: &AnimationSettings, log_y: bool) -> Option<AnimationSpec> {
        chart::animation_spec(&self.combined, settings, log_y)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::Dashboard;
    use crate::{
        chart::ChartConfig,
        config::{Config, Color},
        error::Error,
        loader::load_inputs,
        model::ChartType,
    };

    #[test]
    fn unittest_dashboard_from_default_config() -> eyre::Result<()> {
        let config = Config::default();
        let raw = load_inputs(&config)?;
        let start = config.general.start.and_hms_opt(0, 0, 0).unwrap();
        let dashboard = Dashboard::from_raw(&raw, start, config.general.step()?, config.general.window)?;

        assert_eq!(dashboard.instruments.len(), 2);
        assert_eq!(dashboard.combined.len(), 1000);
        assert_eq!(dashboard.cards().count(), 2);

        let series = &dashboard.instruments[0].series;
        assert!(series[1].sma.is_none());
        assert!(series[2].sma.is_some() && series[2].ema.is_some());

        let metrics = dashboard.instruments[0].metrics.expect("non-empty");
        assert_eq!(metrics.first, 1000.0);
        assert!(metrics.sharpe.is_none());

        let traces = dashboard.traces(&ChartConfig {
            chart_type: ChartType::Line,
            ..Default::default()
        });
        assert_eq!(traces[1].color, Color::Red);

        Ok(())
    }

    #[test]
    fn unittest_dashboard_scenario() -> eyre::Result<()> {
        let raw = crate::loader::RawData {
            instruments: vec![crate::loader::RawInstrument {
                config: Config::default().instruments[0].clone(),
                prices: vec![100.0, 110.0, 90.0],
            }],
        };
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let dashboard = Dashboard::from_raw(&raw, start, Duration::days(1), 3)?;

        assert_eq!(dashboard.animation().frame_sizes(), vec![1, 2, 3]);

        let zero = crate::loader::RawData {
            instruments: vec![crate::loader::RawInstrument {
                config: Config::default().instruments[0].clone(),
                prices: vec![0.0, 1.0],
            }],
        };
        assert!(matches!(
            Dashboard::from_raw(&zero, start, Duration::days(1), 3),
            Err(Error::DivisionByZero(_))
        ));

        Ok(())
    }
}
