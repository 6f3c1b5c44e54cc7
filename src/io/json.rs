//! JSON export of a comparison outcome.
//!
//! Each policy's trace becomes an object keyed by `HH:MM` step timestamps
//! with `input`, `actions`, and `output` sections, followed by a `final`
//! block carrying the comparative metrics.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value, json};

use crate::error::SimError;
use crate::sim::orchestrator::ComparisonOutcome;
use crate::sim::types::StepRecord;

/// Builds the full comparison document.
pub fn comparison_to_json(outcome: &ComparisonOutcome) -> Value {
    json!({
        "basic": trace_value(&outcome.basic_trace),
        "smart": trace_value(&outcome.smart_trace),
        "final": {
            "smart_balance": outcome.metrics.smart_balance,
            "basic_balance": outcome.metrics.basic_balance,
            "balance_difference": outcome.metrics.balance_difference,
            "cost_without_system": outcome.metrics.cost_without_system,
            "smart_saving": outcome.metrics.smart_saving,
            "basic_saving": outcome.metrics.basic_saving,
        },
    })
}

/// Writes the comparison document to a file, pretty-printed.
///
/// # Errors
///
/// I/O and serialization errors.
pub fn export_comparison_json(outcome: &ComparisonOutcome, path: &Path) -> Result<(), SimError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &comparison_to_json(outcome))?;
    writer.flush()?;
    Ok(())
}

fn trace_value(trace: &[StepRecord]) -> Value {
    let mut steps = Map::new();
    for r in trace {
        let actions: Vec<Value> = r
            .actions
            .iter()
            .map(|a| json!({ "flow": a.flow.label(), "kwh": a.kwh }))
            .collect();
        steps.insert(
            r.clock.to_string(),
            json!({
                "input": {
                    "price": r.price,
                    "solar_kwh": r.solar_kwh,
                    "wind_kwh": r.wind_kwh,
                    "consumption_kwh": r.consumption_kwh,
                    "battery_before_kwh": r.battery_before,
                },
                "actions": actions,
                "output": {
                    "balance": r.balance_after,
                    "battery_after_kwh": r.battery_after,
                },
            }),
        );
    }
    Value::Object(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::TimePoint;
    use crate::sim::metrics::FinalMetrics;
    use crate::sim::types::{Action, FlowKind};

    fn make_outcome() -> ComparisonOutcome {
        let record = StepRecord {
            clock: TimePoint::new(12, 0),
            price: 0.1,
            solar_kwh: 2.0,
            wind_kwh: 0.5,
            consumption_kwh: 1.0,
            battery_before: 0.0,
            actions: vec![
                Action::new(FlowKind::ProductionToConsumption, 1.0),
                Action::new(FlowKind::ProductionToBattery, 1.0),
            ],
            balance_after: 0.0,
            battery_after: 1.0,
        };
        let basic = vec![record.clone()];
        let smart = vec![record];
        let metrics = FinalMetrics::from_traces(&smart, &basic);
        ComparisonOutcome {
            basic_trace: basic,
            smart_trace: smart,
            metrics,
        }
    }

    #[test]
    fn steps_are_keyed_by_timestamp() {
        let doc = comparison_to_json(&make_outcome());
        assert!(doc["basic"]["12:00"].is_object());
        assert!(doc["smart"]["12:00"].is_object());
    }

    #[test]
    fn step_entries_carry_all_sections() {
        let doc = comparison_to_json(&make_outcome());
        let step = &doc["basic"]["12:00"];
        assert_eq!(step["input"]["consumption_kwh"], 1.0);
        assert_eq!(step["output"]["battery_after_kwh"], 1.0);
        let actions = step["actions"].as_array().expect("actions should be a list");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0]["flow"], "production_to_consumption");
    }

    #[test]
    fn final_block_mirrors_metrics() {
        let outcome = make_outcome();
        let doc = comparison_to_json(&outcome);
        let diff = doc["final"]["balance_difference"]
            .as_f64()
            .expect("difference should be a number");
        assert!((diff - f64::from(outcome.metrics.balance_difference)).abs() < 1e-9);
    }
}
