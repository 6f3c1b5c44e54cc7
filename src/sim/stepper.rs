//! The per-policy simulation state machine.

use tracing::{debug, warn};

use crate::data::dataset::DayDataset;
use crate::data::series::TimePoint;
use crate::error::SimError;
use crate::policy::DecisionPolicy;
use crate::sim::clock::DayClock;
use crate::sim::types::{PolicyState, StepInput, StepRecord};
use crate::sim::validator;

/// Immutable parameters shared by both steppers of a comparison run.
#[derive(Debug, Clone, Copy)]
pub struct StepperParams {
    /// Minutes of simulated time per decision step.
    pub interval_minutes: u32,
    /// Battery capacity (kWh).
    pub battery_capacity_kwh: f32,
    /// Export price as a fraction of the import price.
    pub tariff: f32,
    /// Policy invocations allowed per step before the run aborts.
    pub max_validation_retries: u32,
}

/// Run lifecycle of a stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

/// Mutable per-run quantities, owned exclusively by one stepper.
#[derive(Debug, Clone, Copy)]
pub struct SimulationState {
    pub balance: f32,
    pub battery_level: f32,
    pub clock: TimePoint,
    pub last_clock: TimePoint,
}

impl SimulationState {
    fn initial() -> Self {
        Self {
            balance: 0.0,
            battery_level: 0.0,
            clock: TimePoint::MIDNIGHT,
            last_clock: TimePoint::MIDNIGHT,
        }
    }
}

/// Advances simulated time for one policy, validating and committing each
/// decision and collecting the run's trace.
///
/// The dataset is borrowed immutably, so two steppers comparing policies
/// can share one dataset; every mutable quantity lives in the stepper's
/// own [`SimulationState`].
pub struct SimulationStepper<'a, P: DecisionPolicy> {
    dataset: &'a DayDataset,
    params: StepperParams,
    policy: P,
    state: SimulationState,
    run_state: RunState,
    trace: Vec<StepRecord>,
}

impl<'a, P: DecisionPolicy> SimulationStepper<'a, P> {
    /// Creates an idle stepper at midnight with an empty battery and a
    /// zero balance.
    pub fn new(dataset: &'a DayDataset, params: StepperParams, policy: P) -> Self {
        Self {
            dataset,
            params,
            policy,
            state: SimulationState::initial(),
            run_state: RunState::Idle,
            trace: Vec::new(),
        }
    }

    /// Current lifecycle state.
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Committed state after the most recent step.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The trace committed so far.
    pub fn trace(&self) -> &[StepRecord] {
        &self.trace
    }

    /// Consumes the stepper, yielding its trace.
    pub fn into_trace(self) -> Vec<StepRecord> {
        self.trace
    }

    /// The policy's display name.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Runs the full day.
    ///
    /// # Errors
    ///
    /// - [`SimError::AlreadyRun`] when invoked on a non-idle stepper.
    /// - [`SimError::DataGap`] when the dataset cannot cover an interval.
    /// - [`SimError::PolicyContract`] when a step exhausts its validation
    ///   retries.
    ///
    /// An error leaves the stepper in the `Running` state with the steps
    /// committed so far still in the trace.
    pub fn run(&mut self) -> Result<(), SimError> {
        if self.run_state != RunState::Idle {
            return Err(SimError::AlreadyRun {
                policy: self.policy.name(),
            });
        }
        self.run_state = RunState::Running;

        let mut clock = DayClock::new(self.params.interval_minutes);
        self.trace.reserve(clock.total_steps() as usize);
        while let Some((last_m, now_m)) = clock.tick() {
            self.step(last_m, now_m)?;
        }

        self.run_state = RunState::Completed;
        Ok(())
    }

    fn step(&mut self, last_m: u32, now_m: u32) -> Result<(), SimError> {
        let last = TimePoint::from_total_minutes(last_m);
        let now = TimePoint::from_total_minutes(now_m);

        let truth = self.dataset.ground_truth_minutes(last_m, now_m)?;
        let input = StepInput {
            last_clock: last,
            clock: now,
            truth,
        };
        let policy_state = PolicyState {
            balance: self.state.balance,
            battery_level: self.state.battery_level,
            battery_capacity: self.params.battery_capacity_kwh,
            tariff: self.params.tariff,
        };

        let mut attempts = 0;
        let decision = loop {
            attempts += 1;
            let decision = self.policy.decide(&input, &policy_state);
            match validator::validate(
                &decision,
                self.state.battery_level,
                &truth,
                self.params.battery_capacity_kwh,
            ) {
                Ok(_) => break decision,
                Err(reason) if attempts < self.params.max_validation_retries => {
                    warn!(
                        policy = self.policy.name(),
                        clock = %now,
                        attempt = attempts,
                        reason = %reason,
                        "decision rejected, retrying"
                    );
                }
                Err(reason) => {
                    return Err(SimError::PolicyContract {
                        policy: self.policy.name(),
                        clock: now,
                        attempts,
                        reason,
                    });
                }
            }
        };

        self.state.last_clock = last;
        self.state.clock = now;
        self.state.balance = decision.balance;
        self.state.battery_level = decision.battery_level;

        debug!(
            policy = self.policy.name(),
            clock = %now,
            price = truth.price,
            solar_kwh = truth.solar_kwh,
            consumption_kwh = truth.consumption_kwh,
            balance = decision.balance,
            battery_kwh = decision.battery_level,
            "step committed"
        );

        self.trace.push(StepRecord {
            clock: now,
            price: truth.price,
            solar_kwh: truth.solar_kwh,
            wind_kwh: truth.wind_kwh,
            consumption_kwh: truth.consumption_kwh,
            battery_before: policy_state.battery_level,
            actions: decision.actions,
            balance_after: decision.balance,
            battery_after: decision.battery_level,
        });
        Ok(())
    }
}
