//! Shared test fixtures for integration tests.

use hems_sim::config::ScenarioConfig;
use hems_sim::data::dataset::DayDataset;
use hems_sim::data::series::Series;
use hems_sim::sim::orchestrator::{ComparisonOutcome, SimulationOrchestrator};
use hems_sim::sim::stepper::StepperParams;

/// Default scenario (hourly steps, 10 kWh battery, synthetic seed 42).
pub fn default_scenario() -> ScenarioConfig {
    ScenarioConfig::baseline()
}

/// Synthetic day matching the default scenario's seed.
pub fn default_dataset() -> DayDataset {
    DayDataset::synthetic(default_scenario().data.seed)
}

/// Default stepper parameters as the baseline scenario prescribes them.
pub fn default_params() -> StepperParams {
    default_scenario().stepper_params()
}

/// Runs the full baseline-vs-smart comparison for a scenario.
pub fn run_comparison(scenario: &ScenarioConfig) -> ComparisonOutcome {
    let dataset = DayDataset::synthetic(scenario.data.seed);
    let orchestrator =
        SimulationOrchestrator::from_config(scenario, &dataset).expect("scenario should be valid");
    orchestrator.run().expect("comparison run should succeed")
}

/// Hourly series holding `value` all day.
pub fn constant_series(value: f32) -> Series {
    Series::new((0..24).map(|h| (h * 60, value)).collect())
}

/// Dataset with constant price, solar, wind, and consumption power.
pub fn constant_dataset(price: f32, solar: f32, wind: f32, consumption: f32) -> DayDataset {
    DayDataset::new(
        constant_series(price),
        constant_series(solar),
        constant_series(wind),
        constant_series(consumption),
    )
}
