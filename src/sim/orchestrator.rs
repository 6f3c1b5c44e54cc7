//! Runs both policies over one dataset and derives the comparison.

use tracing::info;

use crate::config::ScenarioConfig;
use crate::data::dataset::DayDataset;
use crate::error::SimError;
use crate::policy::{BaselinePolicy, DecisionPolicy, ThresholdPolicy};
use crate::sim::metrics::FinalMetrics;
use crate::sim::stepper::{SimulationStepper, StepperParams};
use crate::sim::types::StepRecord;

/// Everything a comparison run produces.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub basic_trace: Vec<StepRecord>,
    pub smart_trace: Vec<StepRecord>,
    pub metrics: FinalMetrics,
}

/// Builds and runs the baseline and smart steppers over a shared dataset.
///
/// Both steppers receive identical parameters and borrow the same
/// immutable dataset; each owns its own state, so the runs cannot
/// interfere with one another.
#[derive(Debug)]
pub struct SimulationOrchestrator<'a> {
    dataset: &'a DayDataset,
    params: StepperParams,
    smart: ThresholdPolicy,
}

impl<'a> SimulationOrchestrator<'a> {
    /// Builds an orchestrator from a scenario configuration.
    ///
    /// # Errors
    ///
    /// The first configuration error, surfaced before any stepping.
    pub fn from_config(
        config: &ScenarioConfig,
        dataset: &'a DayDataset,
    ) -> Result<Self, SimError> {
        if let Some(error) = config.validate().into_iter().next() {
            return Err(SimError::Config(error));
        }
        let smart = ThresholdPolicy::from_price_series(
            &dataset.price,
            config.smart.buy_factor,
            config.smart.sell_factor,
            config.smart.reserve_kwh,
        );
        Ok(Self {
            dataset,
            params: config.stepper_params(),
            smart,
        })
    }

    /// The parameters both steppers will run with.
    pub fn params(&self) -> StepperParams {
        self.params
    }

    /// Runs both policies to completion and computes the final metrics.
    ///
    /// # Errors
    ///
    /// The first fatal error from either run; see
    /// [`SimulationStepper::run`].
    pub fn run(&self) -> Result<ComparisonOutcome, SimError> {
        let basic_trace = self.run_policy(BaselinePolicy)?;
        let smart_trace = self.run_policy(self.smart)?;
        let metrics = FinalMetrics::from_traces(&smart_trace, &basic_trace);
        info!(
            smart_balance = metrics.smart_balance,
            basic_balance = metrics.basic_balance,
            balance_difference = metrics.balance_difference,
            "comparison complete"
        );
        Ok(ComparisonOutcome {
            basic_trace,
            smart_trace,
            metrics,
        })
    }

    fn run_policy<P: DecisionPolicy>(&self, policy: P) -> Result<Vec<StepRecord>, SimError> {
        info!(
            policy = policy.name(),
            interval_minutes = self.params.interval_minutes,
            "starting run"
        );
        let mut stepper = SimulationStepper::new(self.dataset, self.params, policy);
        stepper.run()?;
        Ok(stepper.into_trace())
    }
}
