//! # Multilayer Strain CLI
//!
//! Runs a temperature sweep over a layer stack described by a script
//! file and writes the stress/strain profiles to CSV.
//!
//! ```text
//! strain_cli <script-file> T1 [T2] [steps]
//! ```
//!
//! With one temperature the stack is evaluated as-is at T1. With two,
//! the temperature ramps from T1 to T2 (lattice mismatch locked at
//! T1), in 10 steps unless a count is given.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use strain_core::{parse_script, report, MaterialDb, SolveConfig, StrainError, StrainResult};
use strain_core::{Structure, SweepStep};

const HELP: &str = "Usage: strain_cli <script-file> T1 [T2] [number of steps]";
const DEFAULT_RAMP_STEPS: usize = 10;

fn parse_temperature(text: &str, name: &str) -> StrainResult<f64> {
    text.parse().map_err(|_| {
        StrainError::invalid_input(name, text, "Temperature must be a number in K")
    })
}

/// `stack.txt 850 300` becomes `stack_850_300_rlt.csv` next to the
/// script file.
fn output_path(script: &Path, args: &[String]) -> PathBuf {
    let stem = script
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());
    let mut name = stem;
    for arg in &args[1..] {
        name.push('_');
        name.push_str(arg);
    }
    name.push_str("_rlt.csv");
    script.with_file_name(name)
}

fn run(args: &[String]) -> StrainResult<Vec<SweepStep>> {
    let script_path = Path::new(&args[0]);
    let text = std::fs::read_to_string(script_path).map_err(|e| {
        StrainError::file_error("read", script_path.display().to_string(), e.to_string())
    })?;
    println!("parsing {}", script_path.display());
    let specs = parse_script(&text)?;
    let mut structure = Structure::new(&specs, MaterialDb::builtin(), SolveConfig::default())?;
    for layer in structure.layers().iter().rev() {
        println!("  {}", layer.name());
    }

    println!("running");
    let steps = match args.len() {
        2 => {
            let t1 = parse_temperature(&args[1], "T1")?;
            structure.statusquo(t1)?
        }
        3 | 4 => {
            let t1 = parse_temperature(&args[1], "T1")?;
            let t2 = parse_temperature(&args[2], "T2")?;
            let num_steps = if args.len() == 4 {
                args[3].parse().map_err(|_| {
                    StrainError::invalid_input(
                        "steps",
                        args[3].clone(),
                        "Step count must be a positive integer",
                    )
                })?
            } else {
                DEFAULT_RAMP_STEPS
            };
            structure.ramp_temperature(t1, t2, num_steps)?
        }
        _ => unreachable!("argument count checked in main"),
    };
    for step in &steps {
        println!(
            "  T = {:7.1} K   R = {:12.4} m   neutral plane = {:.4} um",
            step.temperature_k.0, step.radius_m.0, step.neutral_plane_um.0
        );
    }

    let out = output_path(script_path, args);
    println!("saving {}", out.display());
    report::write_csv(&steps, &out)?;
    println!("done");
    Ok(steps)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 4 {
        eprintln!("{}", HELP);
        eprintln!("Error: expected 2 to 4 arguments, got {}", args.len());
        return ExitCode::FAILURE;
    }
    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
