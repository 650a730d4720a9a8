use std::{fs, path::Path};

use eyre::{eyre, WrapErr};
use itertools::Itertools;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::{
    config::{Config, InstrumentConfig, SourceConfig},
    model::Price,
};

pub trait PriceSource {
    fn load(&self) -> eyre::Result<Vec<Price>>;
}

/// Raw prices of every configured instrument, in config order.
#[derive(Debug, Clone)]
pub struct RawData {
    pub instruments: Vec<RawInstrument>,
}

#[derive(Debug, Clone)]
pub struct RawInstrument {
    pub config: InstrumentConfig,
    pub prices: Vec<Price>,
}

/// Reads every instrument source once. Any missing or malformed input is
/// fatal.
pub fn load_inputs(config: &Config) -> eyre::Result<RawData> {
    let mut instruments = Vec::with_capacity(config.instruments.len());

    for instrument in &config.instruments {
        let prices = source_for(&instrument.source)
            .load()
            .wrap_err_with(|| format!("failed to load prices for {}", instrument.label))?;

        if instrument.stride == 0 {
            return Err(eyre!("stride of {} must be positive", instrument.label));
        }

        let prices = prices.into_iter().step_by(instrument.stride).collect_vec();
        info!(label = %instrument.label, len = prices.len(), "loaded prices");

        instruments.push(RawInstrument {
            config: instrument.clone(),
            prices,
        });
    }

    Ok(RawData { instruments })
}

fn source_for(source: &SourceConfig) -> Box<dyn PriceSource + '_> {
    match source {
        SourceConfig::Csv {
            path,
            column,
            skip,
            rebase,
        } => Box::new(CsvColumnSource {
            path,
            column,
            skip: *skip,
            rebase: *rebase,
        }),
        SourceConfig::Json { path } => Box::new(JsonArraySource { path }),
        SourceConfig::Synthetic {
            seed,
            len,
            start_price,
            volatility,
        } => Box::new(SyntheticSource {
            seed: *seed,
            len: *len,
            start_price: *start_price,
            volatility: *volatility,
        }),
    }
}

pub struct CsvColumnSource<'a> {
    pub path: &'a Path,
    pub column: &'a str,
    pub skip: usize,
    pub rebase: Option<f64>,
}

impl PriceSource for CsvColumnSource<'_> {
    fn load(&self) -> eyre::Result<Vec<Price>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .from_path(self.path)
            .wrap_err_with(|| format!("cannot open {}", self.path.display()))?;

        let position = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == self.column)
            .ok_or_else(|| eyre!("column {} not found in {}", self.column, self.path.display()))?;

        let mut prices = vec![];

        for record in reader.records().skip(self.skip) {
            let record = record?;
            let cell = record.get(position).unwrap_or("").trim();

            // gaps in the column are dropped, not zero-filled
            if cell.is_empty() {
                continue;
            }

            prices.push(cell.parse::<Price>()?);
        }

        debug!(path = %self.path.display(), column = self.column, len = prices.len(), "read csv column");

        match self.rebase {
            Some(base) => rebase(prices, base),
            None => Ok(prices),
        }
    }
}

/// Scales `prices` so the first value becomes `base`.
pub fn rebase(prices: Vec<Price>, base: f64) -> eyre::Result<Vec<Price>> {
    let Some(&first) = prices.first() else {
        return Ok(prices);
    };

    if first == 0.0 {
        return Err(eyre!("cannot rebase a series starting at zero"));
    }

    Ok(prices.into_iter().map(|p| p * base / first).collect())
}

pub struct JsonArraySource<'a> {
    pub path: &'a Path,
}

impl PriceSource for JsonArraySource<'_> {
    fn load(&self) -> eyre::Result<Vec<Price>> {
        let content = fs::read_to_string(self.path)
            .wrap_err_with(|| format!("cannot read {}", self.path.display()))?;
        let prices: Vec<Price> = serde_json::from_str(&content)?;
        Ok(prices)
    }
}

/// Random walk with uniform per-step returns in `[-volatility, volatility)`.
pub struct SyntheticSource {
    pub seed: u64,
    pub len: usize,
    pub start_price: Price,
    pub volatility: f64,
}

impl PriceSource for SyntheticSource {
    fn load(&self) -> eyre::Result<Vec<Price>> {
        if self.len == 0 {
            return Ok(vec![]);
        }

        if !(self.volatility >= 0.0 && self.volatility < 1.0) {
            return Err(eyre!("volatility must be in [0, 1), got {}", self.volatility));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut price = self.start_price;
        let mut prices = Vec::with_capacity(self.len);
        prices.push(price);

        for _ in 1..self.len {
            let r = if self.volatility > 0.0 {
                rng.gen_range(-self.volatility..self.volatility)
            } else {
                0.0
            };
            price *= 1.0 + r;
            prices.push(price);
        }

        Ok(prices)
    }
}
