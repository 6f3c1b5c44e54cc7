//! Conservation and capacity validation of proposed decisions.

use thiserror::Error;

use crate::data::dataset::GroundTruth;
use crate::sim::types::{Action, Decision};

/// Numeric tolerance for conservation and bounds checks.
pub const EPSILON: f32 = 1e-3;

/// Why a proposed decision was rejected.
///
/// Rejections are recoverable: the stepper retries the same policy call a
/// bounded number of times before escalating to a fatal contract error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("production actions move {produced:.3} kWh but only {available:.3} kWh was produced")]
    ProductionExceedsAvailable { produced: f32, available: f32 },

    #[error("consumption actions cover {served:.3} kWh of the required {required:.3} kWh")]
    ConsumptionUnmet { served: f32, required: f32 },

    #[error("battery would fall to {level:.3} kWh")]
    BatteryUnderflow { level: f32 },

    #[error("battery would reach {level:.3} kWh, above the {capacity:.3} kWh capacity")]
    BatteryOverflow { level: f32, capacity: f32 },

    #[error(
        "declared battery level {declared:.3} kWh disagrees with the \
         accumulated flows ({expected:.3} kWh)"
    )]
    InconsistentAccounting { declared: f32, expected: f32 },
}

/// The three conservation sums accumulated over one scan of an action
/// list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowTotals {
    /// Energy drawn from production, any destination (kWh).
    pub produced: f32,
    /// Energy delivered to consumption, any source (kWh).
    pub consumed: f32,
    /// Net battery level change (kWh; positive charges).
    pub battery_delta: f32,
}

impl FlowTotals {
    /// Accumulates all three sums in a single pass.
    pub fn from_actions(actions: &[Action]) -> Self {
        let mut totals = Self::default();
        for action in actions {
            if action.flow.draws_from_production() {
                totals.produced += action.kwh;
            }
            if action.flow.feeds_consumption() {
                totals.consumed += action.kwh;
            }
            totals.battery_delta += action.flow.battery_sign() * action.kwh;
        }
        totals
    }
}

/// Checks a decision against the step's ground truth.
///
/// The ground truth is resampled once per step by the stepper and shared
/// between the policy input and this check, so validation adds no repeated
/// resampling work. Wind is tracked in the ground truth but no rule
/// constrains it yet.
///
/// # Errors
///
/// The first violated rule, as a [`RejectReason`].
pub fn validate(
    decision: &Decision,
    battery_before: f32,
    truth: &GroundTruth,
    battery_capacity: f32,
) -> Result<FlowTotals, RejectReason> {
    let totals = FlowTotals::from_actions(&decision.actions);

    if totals.produced > truth.solar_kwh + EPSILON {
        return Err(RejectReason::ProductionExceedsAvailable {
            produced: totals.produced,
            available: truth.solar_kwh,
        });
    }
    if totals.consumed < truth.consumption_kwh - EPSILON {
        return Err(RejectReason::ConsumptionUnmet {
            served: totals.consumed,
            required: truth.consumption_kwh,
        });
    }

    let level = battery_before + totals.battery_delta;
    if level < -EPSILON {
        return Err(RejectReason::BatteryUnderflow { level });
    }
    if level > battery_capacity + EPSILON {
        return Err(RejectReason::BatteryOverflow {
            level,
            capacity: battery_capacity,
        });
    }
    if (decision.battery_level - level).abs() > EPSILON {
        return Err(RejectReason::InconsistentAccounting {
            declared: decision.battery_level,
            expected: level,
        });
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::sim::types::FlowKind;

    fn truth(solar: f32, consumption: f32) -> GroundTruth {
        GroundTruth {
            price: 0.1,
            solar_kwh: solar,
            wind_kwh: 0.5,
            consumption_kwh: consumption,
        }
    }

    fn decision(actions: Vec<Action>, battery_level: f32) -> Decision {
        Decision {
            actions,
            balance: 0.0,
            battery_level,
        }
    }

    #[test]
    fn totals_accumulate_in_one_pass() {
        let actions = vec![
            Action::new(FlowKind::ProductionToConsumption, 1.0),
            Action::new(FlowKind::ProductionToBattery, 2.0),
            Action::new(FlowKind::GridToBattery, 0.5),
            Action::new(FlowKind::BatteryToGrid, 0.25),
        ];
        let totals = FlowTotals::from_actions(&actions);
        assert_abs_diff_eq!(totals.produced, 3.0);
        assert_abs_diff_eq!(totals.consumed, 1.0);
        assert_abs_diff_eq!(totals.battery_delta, 2.25);
    }

    #[test]
    fn feasible_decision_passes() {
        let d = decision(
            vec![
                Action::new(FlowKind::ProductionToConsumption, 2.0),
                Action::new(FlowKind::ProductionToBattery, 3.0),
            ],
            3.0,
        );
        let totals = validate(&d, 0.0, &truth(5.0, 2.0), 10.0).expect("should pass");
        assert_abs_diff_eq!(totals.battery_delta, 3.0);
    }

    #[test]
    fn overproduction_is_rejected() {
        let d = decision(
            vec![
                Action::new(FlowKind::ProductionToConsumption, 2.0),
                Action::new(FlowKind::ProductionToGrid, 4.0),
            ],
            0.0,
        );
        let err = validate(&d, 0.0, &truth(5.0, 2.0), 10.0).expect_err("must fail");
        assert!(matches!(
            err,
            RejectReason::ProductionExceedsAvailable { .. }
        ));
    }

    #[test]
    fn unmet_consumption_is_rejected() {
        let d = decision(vec![Action::new(FlowKind::GridToConsumption, 1.0)], 0.0);
        let err = validate(&d, 0.0, &truth(0.0, 2.0), 10.0).expect_err("must fail");
        assert!(matches!(err, RejectReason::ConsumptionUnmet { .. }));
    }

    #[test]
    fn battery_underflow_is_rejected() {
        let d = decision(
            vec![
                Action::new(FlowKind::BatteryToConsumption, 2.0),
                Action::new(FlowKind::GridToConsumption, 0.0),
            ],
            -1.0,
        );
        let err = validate(&d, 1.0, &truth(0.0, 2.0), 10.0).expect_err("must fail");
        assert!(matches!(err, RejectReason::BatteryUnderflow { .. }));
    }

    #[test]
    fn battery_overflow_is_rejected() {
        let d = decision(vec![Action::new(FlowKind::GridToBattery, 5.0)], 14.0);
        let err = validate(&d, 9.0, &truth(0.0, 0.0), 10.0).expect_err("must fail");
        assert!(matches!(err, RejectReason::BatteryOverflow { .. }));
    }

    #[test]
    fn inconsistent_accounting_is_rejected() {
        let d = decision(vec![Action::new(FlowKind::GridToBattery, 2.0)], 0.5);
        let err = validate(&d, 0.0, &truth(0.0, 0.0), 10.0).expect_err("must fail");
        assert!(matches!(err, RejectReason::InconsistentAccounting { .. }));
    }

    #[test]
    fn tolerance_forgives_rounding() {
        // 5e-4 kWh over the solar budget stays within epsilon.
        let d = decision(
            vec![Action::new(FlowKind::ProductionToConsumption, 2.0005)],
            0.0,
        );
        assert!(validate(&d, 0.0, &truth(2.0, 2.0), 10.0).is_ok());
    }

    #[test]
    fn wind_is_not_constrained() {
        // Nothing references wind; a decision ignoring 5 kWh of wind is
        // still feasible.
        let d = decision(vec![Action::new(FlowKind::GridToConsumption, 1.0)], 0.0);
        let t = GroundTruth {
            price: 0.1,
            solar_kwh: 0.0,
            wind_kwh: 5.0,
            consumption_kwh: 1.0,
        };
        assert!(validate(&d, 0.0, &t, 10.0).is_ok());
    }
}
