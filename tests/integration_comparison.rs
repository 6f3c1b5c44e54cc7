//! Integration tests for the baseline-vs-smart comparison run.

mod common;

use approx::assert_abs_diff_eq;
use hems_sim::policy::BaselinePolicy;
use hems_sim::sim::stepper::SimulationStepper;
use hems_sim::sim::types::StepRecord;
use hems_sim::sim::validator::{EPSILON, FlowTotals};

/// Checks the conservation and bounds invariants on every committed
/// record of a trace.
fn assert_trace_invariants(trace: &[StepRecord], battery_capacity: f32) {
    for record in trace {
        let totals = FlowTotals::from_actions(&record.actions);

        assert!(
            totals.produced <= record.solar_kwh + EPSILON,
            "{}: produced {:.4} kWh exceeds solar {:.4} kWh",
            record.clock,
            totals.produced,
            record.solar_kwh
        );
        assert!(
            totals.consumed >= record.consumption_kwh - EPSILON,
            "{}: consumed {:.4} kWh misses demand {:.4} kWh",
            record.clock,
            totals.consumed,
            record.consumption_kwh
        );
        assert!(
            (record.battery_after - (record.battery_before + totals.battery_delta)).abs()
                < EPSILON,
            "{}: battery accounting drifted",
            record.clock
        );
        assert!(
            record.battery_after >= -EPSILON
                && record.battery_after <= battery_capacity + EPSILON,
            "{}: battery level {:.4} kWh out of bounds",
            record.clock,
            record.battery_after
        );
    }
}

#[test]
fn both_traces_satisfy_conservation_and_bounds() {
    let scenario = common::default_scenario();
    let outcome = common::run_comparison(&scenario);
    let capacity = scenario.battery.max_capacity_kwh;

    assert_trace_invariants(&outcome.basic_trace, capacity);
    assert_trace_invariants(&outcome.smart_trace, capacity);
}

#[test]
fn comparison_runs_for_every_preset() {
    use hems_sim::config::ScenarioConfig;
    use hems_sim::sim::clock::DayClock;

    for name in ScenarioConfig::PRESETS {
        let scenario = ScenarioConfig::from_preset(name).expect("preset should load");
        let outcome = common::run_comparison(&scenario);
        let steps = DayClock::new(scenario.simulation.interval_minutes).total_steps() as usize;
        assert_eq!(outcome.basic_trace.len(), steps, "preset {name}");
        assert_eq!(outcome.smart_trace.len(), steps, "preset {name}");
        assert_trace_invariants(&outcome.basic_trace, scenario.battery.max_capacity_kwh);
        assert_trace_invariants(&outcome.smart_trace, scenario.battery.max_capacity_kwh);
    }
}

#[test]
fn balance_difference_is_exactly_smart_minus_basic() {
    let outcome = common::run_comparison(&common::default_scenario());
    let smart = outcome
        .smart_trace
        .last()
        .map(|r| r.balance_after)
        .unwrap_or_default();
    let basic = outcome
        .basic_trace
        .last()
        .map(|r| r.balance_after)
        .unwrap_or_default();
    assert_eq!(outcome.metrics.balance_difference, smart - basic);
}

#[test]
fn no_system_cost_covers_all_consumption() {
    let outcome = common::run_comparison(&common::default_scenario());
    let expected: f32 = outcome
        .basic_trace
        .iter()
        .map(|r| r.consumption_kwh * r.price)
        .sum();
    assert_abs_diff_eq!(
        outcome.metrics.cost_without_system,
        expected,
        epsilon = 1e-5
    );
    assert!(outcome.metrics.cost_without_system > 0.0);
}

#[test]
fn baseline_runs_are_reproducible() {
    let a = common::run_comparison(&common::default_scenario());
    let b = common::run_comparison(&common::default_scenario());
    assert_eq!(a.basic_trace, b.basic_trace);
    assert_eq!(a.smart_trace, b.smart_trace);
    assert_eq!(a.metrics, b.metrics);
}

#[test]
fn sunny_day_fills_the_battery_before_exporting() {
    // 3 kW of sun against a 0.5 kW load: the battery absorbs the surplus
    // until it is full, then everything extra is exported.
    let dataset = common::constant_dataset(0.1, 3.0, 0.2, 0.5);
    let params = common::default_params();
    let mut stepper = SimulationStepper::new(&dataset, params, BaselinePolicy);
    stepper.run().expect("run should succeed");

    let trace = stepper.trace();
    assert_trace_invariants(trace, params.battery_capacity_kwh);

    let final_battery = trace.last().map(|r| r.battery_after).unwrap_or_default();
    assert_abs_diff_eq!(final_battery, params.battery_capacity_kwh, epsilon = 1e-3);

    let exported: f32 = trace
        .iter()
        .flat_map(|r| &r.actions)
        .filter(|a| a.flow == hems_sim::sim::types::FlowKind::ProductionToGrid)
        .map(|a| a.kwh)
        .sum();
    assert!(exported > 0.0, "surplus beyond capacity must be exported");
    // The balance only ever grows on a day with surplus everywhere.
    let final_balance = trace.last().map(|r| r.balance_after).unwrap_or_default();
    assert!(final_balance > 0.0);
}

#[test]
fn dark_day_drains_battery_then_buys() {
    // No sun at all: the baseline leaves the battery empty and pays the
    // full import price for every kWh consumed.
    let dataset = common::constant_dataset(0.2, 0.0, 0.1, 1.0);
    let params = common::default_params();
    let mut stepper = SimulationStepper::new(&dataset, params, BaselinePolicy);
    stepper.run().expect("run should succeed");

    let trace = stepper.trace();
    assert_trace_invariants(trace, params.battery_capacity_kwh);
    let final_balance = trace.last().map(|r| r.balance_after).unwrap_or_default();
    assert_abs_diff_eq!(final_balance, -24.0 * 0.2, epsilon = 1e-3);
}
