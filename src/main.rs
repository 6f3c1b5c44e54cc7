//! Simulator entry point: CLI wiring and config-driven orchestration.

use std::path::Path;
use std::process;

use hems_sim::config::ScenarioConfig;
use hems_sim::data::dataset::DayDataset;
use hems_sim::io::export::export_comparison_csv;
use hems_sim::io::json::export_comparison_json;
use hems_sim::sim::orchestrator::SimulationOrchestrator;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    trace_out: Option<String>,
    json_out: Option<String>,
    quiet: bool,
}

fn print_help() {
    eprintln!("hems-sim — household energy-management simulator");
    eprintln!();
    eprintln!("Usage: hems-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>    Load scenario from TOML config file");
    eprintln!("  --preset <name>      Use a built-in preset (baseline)");
    eprintln!("  --seed <u64>         Override the synthetic data seed");
    eprintln!("  --trace-out <path>   Export both step traces to CSV");
    eprintln!("  --json-out <path>    Export the full comparison to JSON");
    eprintln!("  --quiet              Skip the per-step output");
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        trace_out: None,
        json_out: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--trace-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --trace-out requires a path argument");
                    process::exit(1);
                }
                cli.trace_out = Some(args[i].clone());
            }
            "--json-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --json-out requires a path argument");
                    process::exit(1);
                }
                cli.json_out = Some(args[i].clone());
            }
            "--quiet" => {
                cli.quiet = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline.
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.data.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // All I/O happens here, before stepping begins.
    let dataset = match DayDataset::from_config(&scenario.data) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let orchestrator = match SimulationOrchestrator::from_config(&scenario, &dataset) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let outcome = match orchestrator.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if !cli.quiet {
        println!("--- basic ---");
        for r in &outcome.basic_trace {
            println!("{r}");
        }
        println!();
        println!("--- smart ---");
        for r in &outcome.smart_trace {
            println!("{r}");
        }
        println!();
    }
    println!("{}", outcome.metrics);

    if let Some(ref path) = cli.trace_out {
        if let Err(e) = export_comparison_csv(&outcome, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Trace written to {path}");
    }

    if let Some(ref path) = cli.json_out {
        if let Err(e) = export_comparison_json(&outcome, Path::new(path)) {
            eprintln!("error: failed to write JSON: {e}");
            process::exit(1);
        }
        eprintln!("Comparison written to {path}");
    }
}
