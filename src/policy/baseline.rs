//! Rule-based reference policy.

use super::DecisionPolicy;
use crate::sim::types::{Action, Decision, FlowKind, PolicyState, StepInput};

/// Deterministic greedy policy.
///
/// Consumption is met from solar first; any surplus charges the battery up
/// to its capacity and overflow is sold at the export tariff. A deficit is
/// drawn from the battery first and the remainder is bought from the grid
/// at the full import price. Carries no state of its own, so repeated
/// calls with the same inputs are bit-identical.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaselinePolicy;

impl DecisionPolicy for BaselinePolicy {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn decide(&self, input: &StepInput, state: &PolicyState) -> Decision {
        let truth = &input.truth;
        let mut actions = Vec::new();
        let mut balance = state.balance;
        let mut battery = state.battery_level;

        if truth.solar_kwh >= truth.consumption_kwh {
            if truth.consumption_kwh > 0.0 {
                actions.push(Action::new(
                    FlowKind::ProductionToConsumption,
                    truth.consumption_kwh,
                ));
            }
            let mut surplus = truth.solar_kwh - truth.consumption_kwh;

            let headroom = (state.battery_capacity - battery).max(0.0);
            let stored = surplus.min(headroom);
            if stored > 0.0 {
                actions.push(Action::new(FlowKind::ProductionToBattery, stored));
                battery += stored;
                surplus -= stored;
            }
            if surplus > 0.0 {
                actions.push(Action::new(FlowKind::ProductionToGrid, surplus));
                balance += surplus * truth.price * state.tariff;
            }
        } else {
            if truth.solar_kwh > 0.0 {
                actions.push(Action::new(
                    FlowKind::ProductionToConsumption,
                    truth.solar_kwh,
                ));
            }
            let mut deficit = truth.consumption_kwh - truth.solar_kwh;

            let from_battery = deficit.min(battery);
            if from_battery > 0.0 {
                actions.push(Action::new(FlowKind::BatteryToConsumption, from_battery));
                battery -= from_battery;
                deficit -= from_battery;
            }
            if deficit > 0.0 {
                actions.push(Action::new(FlowKind::GridToConsumption, deficit));
                balance -= deficit * truth.price;
            }
        }

        Decision {
            actions,
            balance,
            battery_level: battery,
        }
    }
}
