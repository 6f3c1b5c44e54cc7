//! Price-threshold arbitrage policy occupying the smart-agent slot.

use super::{BaselinePolicy, DecisionPolicy};
use crate::data::series::Series;
use crate::sim::types::{Action, Decision, FlowKind, PolicyState, StepInput};

/// Deterministic threshold policy standing in for the learned agent.
///
/// Solar and consumption are allocated exactly like [`BaselinePolicy`];
/// on top of that the policy trades with the grid: it fills the remaining
/// battery headroom when the step price is at or below `buy_price`, and
/// sells stored energy above `reserve_kwh` when the price is at or above
/// `sell_price`. Thresholds are fixed at construction from the day's price
/// series, so a decision depends only on the step inputs and the policy is
/// safe to re-invoke under validation retry.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy {
    buy_price: f32,
    sell_price: f32,
    reserve_kwh: f32,
}

impl ThresholdPolicy {
    /// Creates a policy with explicit price thresholds.
    pub fn new(buy_price: f32, sell_price: f32, reserve_kwh: f32) -> Self {
        Self {
            buy_price,
            sell_price,
            reserve_kwh: reserve_kwh.max(0.0),
        }
    }

    /// Derives thresholds from the mean of the day's price samples:
    /// `buy = mean * buy_factor`, `sell = mean * sell_factor`.
    pub fn from_price_series(
        prices: &Series,
        buy_factor: f32,
        sell_factor: f32,
        reserve_kwh: f32,
    ) -> Self {
        let points = prices.points();
        let mean = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|&(_, v)| v).sum::<f32>() / points.len() as f32
        };
        Self::new(mean * buy_factor, mean * sell_factor, reserve_kwh)
    }

    /// Price at or below which the policy buys grid energy into the
    /// battery.
    pub fn buy_price(&self) -> f32 {
        self.buy_price
    }

    /// Price at or above which the policy sells stored energy.
    pub fn sell_price(&self) -> f32 {
        self.sell_price
    }
}

impl DecisionPolicy for ThresholdPolicy {
    fn name(&self) -> &'static str {
        "smart"
    }

    fn decide(&self, input: &StepInput, state: &PolicyState) -> Decision {
        let Decision {
            mut actions,
            mut balance,
            mut battery_level,
        } = BaselinePolicy.decide(input, state);

        let price = input.truth.price;
        let headroom = (state.battery_capacity - battery_level).max(0.0);

        if price <= self.buy_price && headroom > 0.0 {
            actions.push(Action::new(FlowKind::GridToBattery, headroom));
            balance -= headroom * price;
            battery_level += headroom;
        } else if price >= self.sell_price {
            let sellable = (battery_level - self.reserve_kwh).max(0.0);
            if sellable > 0.0 {
                actions.push(Action::new(FlowKind::BatteryToGrid, sellable));
                balance += sellable * price * state.tariff;
                battery_level -= sellable;
            }
        }

        Decision {
            actions,
            balance,
            battery_level,
        }
    }
}
