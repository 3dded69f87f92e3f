// ============================================================================
// main.rs — Biosfera
// Entry point. Initializes logging, parses arguments, and runs the headless
// batch simulation.
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use biosfera::config::SimulationConfig;
use biosfera::headless::{run_headless, HeadlessConfig};

const USAGE: &str = "\
Usage: biosfera [OPTIONS]

Options:
  --ticks N          Number of ticks to simulate (default 10000)
  --seed N           RNG seed (default 0)
  --glaciation T     Trigger a glaciation at tick T (repeatable)
  --meteorite T      Trigger a meteorite at tick T (repeatable)
  --fit-window N     Use the first N ticks for the fit (default 5000)
  --no-fit           Skip the Lotka-Volterra fit
  --out DIR          Export CSV/report into DIR
  --help             Show this message";

fn parse_args() -> Result<(SimulationConfig, HeadlessConfig), String> {
    let mut cfg = SimulationConfig::default();
    let mut opts = HeadlessConfig::default();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "--ticks" => {
                opts.ticks = value("--ticks")?
                    .parse()
                    .map_err(|e| format!("--ticks: {e}"))?;
            }
            "--seed" => {
                cfg.seed = value("--seed")?
                    .parse()
                    .map_err(|e| format!("--seed: {e}"))?;
            }
            "--glaciation" => {
                opts.glaciation_at.push(
                    value("--glaciation")?
                        .parse()
                        .map_err(|e| format!("--glaciation: {e}"))?,
                );
            }
            "--meteorite" => {
                opts.meteorite_at.push(
                    value("--meteorite")?
                        .parse()
                        .map_err(|e| format!("--meteorite: {e}"))?,
                );
            }
            "--fit-window" => {
                opts.fit_window = value("--fit-window")?
                    .parse()
                    .map_err(|e| format!("--fit-window: {e}"))?;
            }
            "--no-fit" => opts.run_fit = false,
            "--out" => opts.export_dir = Some(PathBuf::from(value("--out")?)),
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}\n{USAGE}")),
        }
    }
    Ok((cfg, opts))
}

fn main() -> ExitCode {
    env_logger::init();

    let (cfg, opts) = match parse_args() {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run_headless(cfg, &opts) {
        Ok(outcome) => {
            if let Some(fit) = &outcome.fit {
                log::info!(
                    "Run complete: r={:.4} a={:.4} b={:.4} d={:.4}",
                    fit.params.r,
                    fit.params.a,
                    fit.params.b,
                    fit.params.d,
                );
            } else {
                log::info!("Run complete (no fit)");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Run failed: {err}");
            ExitCode::FAILURE
        }
    }
}
