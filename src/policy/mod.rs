//! Decision policies: the shared contract and its implementations.

pub mod baseline;
pub mod smart;

pub use baseline::BaselinePolicy;
pub use smart::ThresholdPolicy;

use crate::sim::types::{Decision, PolicyState, StepInput};

/// A per-step decision maker.
///
/// Implementations are pure with respect to stepper state: `decide` takes
/// `&self` and must return the same decision for identical inputs, because
/// the stepper re-invokes the same call when validation rejects a
/// decision. A policy that keeps hidden mutable state is not usable under
/// retry.
pub trait DecisionPolicy {
    /// Short name used in logs, exports, and error reports.
    fn name(&self) -> &'static str;

    /// Proposes the energy flows for `(input.last_clock, input.clock]`,
    /// together with the balance and battery level after applying them.
    fn decide(&self, input: &StepInput, state: &PolicyState) -> Decision;
}
