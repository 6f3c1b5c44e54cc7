//! Day datasets: the four ground-truth series and how they are resolved.

use std::collections::HashSet;
use std::f32::consts::PI;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DataConfig;
use crate::data::resampler::Resampler;
use crate::data::series::{Series, TimePoint};
use crate::error::SimError;

/// File names inside a per-date dataset directory.
const PRICE_FILE: &str = "market_prices.csv";
const SOLAR_FILE: &str = "solar_production.csv";
const WIND_FILE: &str = "wind_production.csv";
const CONSUMPTION_FILE: &str = "consumption.csv";

/// Synthetic generator resolution: one sample every 15 minutes.
const SAMPLE_SPACING_MIN: u32 = 15;
const SAMPLES_PER_DAY: usize = 96;

const SUNRISE_HOUR: f32 = 6.0;
const SUNSET_HOUR: f32 = 18.0;
const SOLAR_KW_PEAK: f32 = 3.5;

/// Resampled ground truth for one step interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundTruth {
    /// Mean market price over the interval (currency per kWh).
    pub price: f32,
    /// Solar production over the interval (kWh).
    pub solar_kwh: f32,
    /// Wind production over the interval (kWh). Tracked and recorded, but
    /// not yet constrained by any action rule.
    pub wind_kwh: f32,
    /// Household consumption over the interval (kWh).
    pub consumption_kwh: f32,
}

/// The four raw series for one simulated day.
///
/// A dataset is resolved once before a run and borrowed immutably by every
/// stepper that reads it; nothing mutates it for the duration of a run.
#[derive(Debug, Clone, Default)]
pub struct DayDataset {
    pub price: Series,
    pub solar: Series,
    pub wind: Series,
    pub consumption: Series,
}

impl DayDataset {
    /// Bundles four already-resolved series.
    pub fn new(price: Series, solar: Series, wind: Series, consumption: Series) -> Self {
        Self {
            price,
            solar,
            wind,
            consumption,
        }
    }

    /// Resolves the dataset named by a `[data]` config table.
    ///
    /// # Errors
    ///
    /// Propagates loader errors for the `csv` source. The config must have
    /// been validated first; a `csv` source without a date falls back to an
    /// empty date folder name and fails at load.
    pub fn from_config(config: &DataConfig) -> Result<Self, SimError> {
        match config.source.as_str() {
            "csv" => {
                let date = config.date.as_deref().unwrap_or_default();
                Self::from_csv_dir(&Path::new(&config.dir).join(date))
            }
            _ => Ok(Self::synthetic(config.seed)),
        }
    }

    /// Loads a dataset from a per-date directory of `HH:MM,value` CSV
    /// files (`market_prices.csv`, `solar_production.csv`,
    /// `wind_production.csv`, `consumption.csv`).
    ///
    /// # Errors
    ///
    /// I/O and CSV errors, plus `SimError::Data` for unparsable rows,
    /// duplicate timestamps, or files without samples.
    pub fn from_csv_dir(dir: &Path) -> Result<Self, SimError> {
        Ok(Self {
            price: load_series_csv(&dir.join(PRICE_FILE))?,
            solar: load_series_csv(&dir.join(SOLAR_FILE))?,
            wind: load_series_csv(&dir.join(WIND_FILE))?,
            consumption: load_series_csv(&dir.join(CONSUMPTION_FILE))?,
        })
    }

    /// Generates a deterministic synthetic day at 15-minute resolution.
    ///
    /// Price dips overnight and peaks during the day, solar follows a
    /// half-sine between 06:00 and 18:00, wind is an AR(1)-smoothed
    /// fluctuation, and consumption is a sinusoidal household load that
    /// never drops to zero. The same seed always yields the same day.
    pub fn synthetic(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut price = Vec::with_capacity(SAMPLES_PER_DAY);
        let mut solar = Vec::with_capacity(SAMPLES_PER_DAY);
        let mut wind = Vec::with_capacity(SAMPLES_PER_DAY);
        let mut consumption = Vec::with_capacity(SAMPLES_PER_DAY);
        let mut wind_state = 0.0_f32;

        for i in 0..SAMPLES_PER_DAY {
            let minute = i as u32 * SAMPLE_SPACING_MIN;
            let hour = minute as f32 / 60.0;

            let daily = (2.0 * PI * (hour - 7.0) / 24.0).sin();
            let p = 0.10 + 0.04 * daily + gaussian_noise(&mut rng, 0.004);
            price.push((minute, p.max(0.01)));

            let frac = if (SUNRISE_HOUR..SUNSET_HOUR).contains(&hour) {
                (PI * (hour - SUNRISE_HOUR) / (SUNSET_HOUR - SUNRISE_HOUR)).sin()
            } else {
                0.0
            };
            let kw = SOLAR_KW_PEAK * frac * (1.0 + gaussian_noise(&mut rng, 0.05));
            solar.push((minute, kw.max(0.0)));

            wind_state = 0.9 * wind_state + gaussian_noise(&mut rng, 0.15);
            wind.push((minute, (0.6 + wind_state).clamp(0.0, 3.0)));

            let load =
                0.9 + 0.6 * (2.0 * PI * hour / 24.0 + 1.2).sin() + gaussian_noise(&mut rng, 0.05);
            consumption.push((minute, load.max(0.2)));
        }

        Self {
            price: Series::new(price),
            solar: Series::new(solar),
            wind: Series::new(wind),
            consumption: Series::new(consumption),
        }
    }

    /// Resamples all four quantities over `(last, now]`.
    ///
    /// # Errors
    ///
    /// `SimError::DataGap` naming the first quantity that cannot be
    /// resampled.
    pub fn ground_truth(&self, last: TimePoint, now: TimePoint) -> Result<GroundTruth, SimError> {
        Ok(GroundTruth {
            price: Resampler::new(&self.price, "price").average_over(last, now)?,
            solar_kwh: Resampler::new(&self.solar, "solar").energy_over(last, now)?,
            wind_kwh: Resampler::new(&self.wind, "wind").energy_over(last, now)?,
            consumption_kwh: Resampler::new(&self.consumption, "consumption")
                .energy_over(last, now)?,
        })
    }

    /// [`Self::ground_truth`] on an already-unwrapped minute axis, as the
    /// stepper produces it (`now_m` may be exactly 1440 for the final step
    /// of the day).
    pub fn ground_truth_minutes(&self, last_m: u32, now_m: u32) -> Result<GroundTruth, SimError> {
        Ok(GroundTruth {
            price: Resampler::new(&self.price, "price").average_over_minutes(last_m, now_m)?,
            solar_kwh: Resampler::new(&self.solar, "solar").energy_over_minutes(last_m, now_m)?,
            wind_kwh: Resampler::new(&self.wind, "wind").energy_over_minutes(last_m, now_m)?,
            consumption_kwh: Resampler::new(&self.consumption, "consumption")
                .energy_over_minutes(last_m, now_m)?,
        })
    }
}

/// Reads one `HH:MM,value` CSV file (with a header row) into a series.
fn load_series_csv(path: &Path) -> Result<Series, SimError> {
    let data_err = |message: String| SimError::Data {
        path: path.display().to_string(),
        message,
    };

    let mut reader = csv::Reader::from_path(path)?;
    let mut seen = HashSet::new();
    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let time_field = record
            .get(0)
            .ok_or_else(|| data_err(format!("row {}: missing time column", row + 1)))?;
        let value_field = record
            .get(1)
            .ok_or_else(|| data_err(format!("row {}: missing value column", row + 1)))?;
        let time: TimePoint = time_field
            .parse()
            .map_err(|e| data_err(format!("row {}: {e}", row + 1)))?;
        let value: f32 = value_field
            .trim()
            .parse()
            .map_err(|_| data_err(format!("row {}: invalid value \"{value_field}\"", row + 1)))?;
        if !seen.insert(time.total_minutes()) {
            return Err(data_err(format!("duplicate timestamp {time}")));
        }
        points.push((time.total_minutes(), value));
    }
    if points.is_empty() {
        return Err(data_err("no samples".to_string()));
    }
    Ok(Series::new(points))
}

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}
