//! Post-hoc comparison metrics for a completed run pair.

use std::fmt;

use crate::sim::types::StepRecord;

/// Final comparison between the smart and basic traces.
///
/// Computed once from the two complete traces to keep step data and
/// reported metrics consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalMetrics {
    /// Smart policy's balance after the last step.
    pub smart_balance: f32,
    /// Basic policy's balance after the last step.
    pub basic_balance: f32,
    /// `smart_balance - basic_balance`; negative means the baseline won.
    pub balance_difference: f32,
    /// Cost of buying every consumed kWh from the grid at the historical
    /// price, with no solar and no battery.
    pub cost_without_system: f32,
    /// Smart policy's saving against the no-system cost.
    pub smart_saving: f32,
    /// Basic policy's saving against the no-system cost.
    pub basic_saving: f32,
}

impl FinalMetrics {
    /// Computes all metrics from the two complete traces.
    ///
    /// Both traces cover identical data, so the no-system cost is derived
    /// from the basic trace's recorded consumption and prices.
    pub fn from_traces(smart: &[StepRecord], basic: &[StepRecord]) -> Self {
        let smart_balance = smart.last().map_or(0.0, |r| r.balance_after);
        let basic_balance = basic.last().map_or(0.0, |r| r.balance_after);
        let cost_without_system: f32 = basic
            .iter()
            .map(|r| r.consumption_kwh * r.price)
            .sum();

        Self {
            smart_balance,
            basic_balance,
            balance_difference: smart_balance - basic_balance,
            cost_without_system,
            smart_saving: (smart_balance - (-cost_without_system)).abs(),
            basic_saving: (basic_balance - (-cost_without_system)).abs(),
        }
    }
}

impl fmt::Display for FinalMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Final Report ---")?;
        writeln!(f, "Smart balance:        {:+.4}", self.smart_balance)?;
        writeln!(f, "Basic balance:        {:+.4}", self.basic_balance)?;
        writeln!(f, "Balance difference:   {:+.4}", self.balance_difference)?;
        writeln!(f, "Cost without system:  {:.4}", self.cost_without_system)?;
        writeln!(f, "Smart saving:         {:.4}", self.smart_saving)?;
        write!(f, "Basic saving:         {:.4}", self.basic_saving)
    }
}
