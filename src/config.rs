//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::sim::stepper::StepperParams;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and pricing parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Battery parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Data source selection.
    #[serde(default)]
    pub data: DataConfig,
    /// Smart-policy thresholds.
    #[serde(default)]
    pub smart: SmartConfig,
}

/// Simulation timing and pricing parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Minutes of simulated time per decision step (must be > 0). The
    /// final step of the day is shorter when this does not divide 1440.
    pub interval_minutes: u32,
    /// Export price as a fraction of the import price (0.0-1.0).
    pub tariff: f32,
    /// Policy invocations allowed per step before the run aborts
    /// (must be >= 1).
    pub max_validation_retries: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 60,
            tariff: 0.75,
            max_validation_retries: 3,
        }
    }
}

/// Battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Usable capacity (kWh, must be > 0).
    pub max_capacity_kwh: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            max_capacity_kwh: 10.0,
        }
    }
}

/// Data source selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Data source: `"synthetic"` or `"csv"`.
    pub source: String,
    /// Directory holding per-date dataset folders (csv source).
    pub dir: String,
    /// Dataset date folder name, e.g. `"2025-08-25"` (csv source).
    pub date: Option<String>,
    /// Seed for the synthetic generator.
    pub seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: "synthetic".to_string(),
            dir: "datafiles".to_string(),
            date: None,
            seed: 42,
        }
    }
}

/// Smart-policy thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmartConfig {
    /// Charge from the grid when price <= buy_factor x mean price.
    pub buy_factor: f32,
    /// Sell stored energy when price >= sell_factor x mean price.
    pub sell_factor: f32,
    /// Charge the smart policy never sells (kWh, >= 0).
    pub reserve_kwh: f32,
}

impl Default for SmartConfig {
    fn default() -> Self {
        Self {
            buy_factor: 0.9,
            sell_factor: 1.1,
            reserve_kwh: 1.0,
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario (hourly steps, 10 kWh battery,
    /// 0.75 tariff, synthetic data).
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            battery: BatteryConfig::default(),
            data: DataConfig::default(),
            smart: SmartConfig::default(),
        }
    }

    /// Returns the high-solar preset: sunnier synthetic day and a larger
    /// battery to absorb it.
    pub fn high_solar() -> Self {
        Self {
            battery: BatteryConfig {
                max_capacity_kwh: 15.0,
            },
            data: DataConfig {
                seed: 7,
                ..DataConfig::default()
            },
            smart: SmartConfig {
                reserve_kwh: 2.0,
                ..SmartConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the volatile-prices preset: half-hour steps and tighter
    /// thresholds so the smart policy trades more often.
    pub fn volatile_prices() -> Self {
        Self {
            simulation: SimulationConfig {
                interval_minutes: 30,
                ..SimulationConfig::default()
            },
            battery: BatteryConfig {
                max_capacity_kwh: 12.0,
            },
            data: DataConfig {
                seed: 99,
                ..DataConfig::default()
            },
            smart: SmartConfig {
                buy_factor: 0.95,
                sell_factor: 1.05,
                reserve_kwh: 0.5,
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "high_solar", "volatile_prices"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "high_solar" => Ok(Self::high_solar()),
            "volatile_prices" => Ok(Self::volatile_prices()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// The stepper parameters this scenario prescribes.
    pub fn stepper_params(&self) -> StepperParams {
        StepperParams {
            interval_minutes: self.simulation.interval_minutes,
            battery_capacity_kwh: self.battery.max_capacity_kwh,
            tariff: self.simulation.tariff,
            max_validation_retries: self.simulation.max_validation_retries,
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.interval_minutes == 0 {
            errors.push(ConfigError {
                field: "simulation.interval_minutes".into(),
                message: "must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&s.tariff) {
            errors.push(ConfigError {
                field: "simulation.tariff".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if s.max_validation_retries == 0 {
            errors.push(ConfigError {
                field: "simulation.max_validation_retries".into(),
                message: "must be >= 1".into(),
            });
        }

        if self.battery.max_capacity_kwh <= 0.0 {
            errors.push(ConfigError {
                field: "battery.max_capacity_kwh".into(),
                message: "must be > 0".into(),
            });
        }

        let d = &self.data;
        if d.source != "synthetic" && d.source != "csv" {
            errors.push(ConfigError {
                field: "data.source".into(),
                message: format!("must be \"synthetic\" or \"csv\", got \"{}\"", d.source),
            });
        }
        if d.source == "csv" && d.date.is_none() {
            errors.push(ConfigError {
                field: "data.date".into(),
                message: "required for the csv source".into(),
            });
        }

        let sm = &self.smart;
        if sm.buy_factor < 0.0 {
            errors.push(ConfigError {
                field: "smart.buy_factor".into(),
                message: "must be >= 0".into(),
            });
        }
        if sm.sell_factor < sm.buy_factor {
            errors.push(ConfigError {
                field: "smart.sell_factor".into(),
                message: "must be >= smart.buy_factor".into(),
            });
        }
        if sm.reserve_kwh < 0.0 {
            errors.push(ConfigError {
                field: "smart.reserve_kwh".into(),
                message: "must be >= 0".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
interval_minutes = 30
tariff = 0.5
max_validation_retries = 5

[battery]
max_capacity_kwh = 12.5

[data]
source = "csv"
dir = "datafiles"
date = "2025-08-25"
seed = 7

[smart]
buy_factor = 0.85
sell_factor = 1.15
reserve_kwh = 2.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.interval_minutes), Some(30));
        assert_eq!(cfg.as_ref().map(|c| c.battery.max_capacity_kwh), Some(12.5));
        assert_eq!(
            cfg.as_ref().and_then(|c| c.data.date.clone()),
            Some("2025-08-25".to_string())
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[data]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.data.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.interval_minutes), Some(60));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.tariff), Some(0.75));
        assert_eq!(cfg.as_ref().map(|c| c.battery.max_capacity_kwh), Some(10.0));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
interval_minutes = 60
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_zero_interval() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.interval_minutes = 0;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "simulation.interval_minutes")
        );
    }

    #[test]
    fn validation_catches_bad_tariff() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.tariff = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.tariff"));
    }

    #[test]
    fn validation_catches_zero_retries() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.max_validation_retries = 0;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "simulation.max_validation_retries")
        );
    }

    #[test]
    fn validation_catches_non_positive_capacity() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.max_capacity_kwh = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.max_capacity_kwh"));
    }

    #[test]
    fn validation_catches_bad_source() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.data.source = "http".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "data.source"));
    }

    #[test]
    fn validation_requires_date_for_csv() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.data.source = "csv".to_string();
        cfg.data.date = None;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "data.date"));
    }

    #[test]
    fn validation_catches_crossed_thresholds() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.smart.buy_factor = 1.2;
        cfg.smart.sell_factor = 0.8;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "smart.sell_factor"));
    }

    #[test]
    fn stepper_params_mirror_config() {
        let cfg = ScenarioConfig::volatile_prices();
        let params = cfg.stepper_params();
        assert_eq!(params.interval_minutes, 30);
        assert_eq!(params.battery_capacity_kwh, 12.0);
        assert_eq!(params.tariff, 0.75);
        assert_eq!(params.max_validation_retries, 3);
    }
}
