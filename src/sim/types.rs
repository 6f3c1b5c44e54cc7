//! Core step types: flows, actions, policy I/O, and the per-step record.

use std::fmt;

use crate::data::dataset::GroundTruth;
use crate::data::series::TimePoint;

/// One direction of energy movement between system components.
///
/// The set is closed: adding a flow means adding a variant here and
/// teaching the validator accumulation rules about it, not matching on a
/// new string tag somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    ProductionToConsumption,
    ProductionToBattery,
    ProductionToGrid,
    BatteryToConsumption,
    BatteryToGrid,
    GridToConsumption,
    GridToBattery,
}

impl FlowKind {
    /// Every flow kind, in display order.
    pub const ALL: [FlowKind; 7] = [
        FlowKind::ProductionToConsumption,
        FlowKind::ProductionToBattery,
        FlowKind::ProductionToGrid,
        FlowKind::BatteryToConsumption,
        FlowKind::BatteryToGrid,
        FlowKind::GridToConsumption,
        FlowKind::GridToBattery,
    ];

    /// Stable label used in exports and logs.
    pub fn label(self) -> &'static str {
        match self {
            FlowKind::ProductionToConsumption => "production_to_consumption",
            FlowKind::ProductionToBattery => "production_to_battery",
            FlowKind::ProductionToGrid => "production_to_grid",
            FlowKind::BatteryToConsumption => "battery_to_consumption",
            FlowKind::BatteryToGrid => "battery_to_grid",
            FlowKind::GridToConsumption => "grid_to_consumption",
            FlowKind::GridToBattery => "grid_to_battery",
        }
    }

    /// Whether production is the source of this flow.
    pub fn draws_from_production(self) -> bool {
        matches!(
            self,
            FlowKind::ProductionToConsumption
                | FlowKind::ProductionToBattery
                | FlowKind::ProductionToGrid
        )
    }

    /// Whether consumption is the destination of this flow.
    pub fn feeds_consumption(self) -> bool {
        matches!(
            self,
            FlowKind::ProductionToConsumption
                | FlowKind::BatteryToConsumption
                | FlowKind::GridToConsumption
        )
    }

    /// Battery level change per kWh moved: +1 charging, -1 discharging,
    /// 0 for flows that bypass the battery.
    pub fn battery_sign(self) -> f32 {
        match self {
            FlowKind::ProductionToBattery | FlowKind::GridToBattery => 1.0,
            FlowKind::BatteryToConsumption | FlowKind::BatteryToGrid => -1.0,
            _ => 0.0,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tagged amount of energy moved during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub flow: FlowKind,
    /// Energy moved, in kWh. Always non-negative; direction lives in the
    /// flow kind.
    pub kwh: f32,
}

impl Action {
    /// Creates an action.
    ///
    /// # Panics
    ///
    /// Panics if `kwh` is negative.
    pub fn new(flow: FlowKind, kwh: f32) -> Self {
        assert!(kwh >= 0.0, "action energy must be non-negative");
        Self { flow, kwh }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:.3}", self.flow, self.kwh)
    }
}

/// Timing and ground truth for one step, fed to the policy.
#[derive(Debug, Clone, Copy)]
pub struct StepInput {
    /// End of the previous step.
    pub last_clock: TimePoint,
    /// End of this step; the decision covers `(last_clock, clock]`.
    pub clock: TimePoint,
    /// Resampled quantities for the step.
    pub truth: GroundTruth,
}

/// Mutable simulation quantities visible to a policy, plus fixed limits.
#[derive(Debug, Clone, Copy)]
pub struct PolicyState {
    /// Account balance; negative means net spending so far.
    pub balance: f32,
    /// Battery charge before this step (kWh).
    pub battery_level: f32,
    /// Battery capacity (kWh).
    pub battery_capacity: f32,
    /// Export price as a fraction of the import price.
    pub tariff: f32,
}

/// A policy's proposed outcome for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Proposed energy flows. Order matters only for display.
    pub actions: Vec<Action>,
    /// Balance after the step, by the policy's own accounting.
    pub balance: f32,
    /// Battery level after the step, by the policy's own accounting.
    pub battery_level: f32,
}

/// Immutable snapshot appended to the trace after a committed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Clock reading at the end of the step.
    pub clock: TimePoint,
    /// Mean market price over the step.
    pub price: f32,
    pub solar_kwh: f32,
    pub wind_kwh: f32,
    pub consumption_kwh: f32,
    /// Battery level before the step was committed (kWh).
    pub battery_before: f32,
    /// The validated actions that were committed.
    pub actions: Vec<Action>,
    pub balance_after: f32,
    pub battery_after: f32,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | price={:.4}  solar={:.3}  wind={:.3}  cons={:.3} kWh | \
             bat {:.3} -> {:.3} kWh  balance={:+.4} | ",
            self.clock,
            self.price,
            self.solar_kwh,
            self.wind_kwh,
            self.consumption_kwh,
            self.battery_before,
            self.battery_after,
            self.balance_after,
        )?;
        if self.actions.is_empty() {
            return f.write_str("no actions");
        }
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                f.write_str("  ")?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}
