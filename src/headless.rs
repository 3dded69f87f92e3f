// ============================================================================
// headless.rs — Biosfera
// Headless simulation runner for fast long-horizon batches: scripted event
// triggers, progress/ETA logging, optional fit and export at the end.
// ============================================================================

use std::path::PathBuf;
use std::time::Instant;

use crate::config::SimulationConfig;
use crate::error::{BiosferaError, BiosferaResult};
use crate::events::EventTrigger;
use crate::fit::{self, FitOptions, FitResult};
use crate::metrics::SimDiagnostics;
use crate::runlog::RunLog;
use crate::world::WorldState;

#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    pub ticks: u64,
    /// Scripted glaciation triggers, by tick index.
    pub glaciation_at: Vec<u64>,
    /// Scripted meteorite triggers, by tick index.
    pub meteorite_at: Vec<u64>,
    /// Use only the first `fit_window` ticks of history for the fit.
    pub fit_window: usize,
    pub run_fit: bool,
    pub export_dir: Option<PathBuf>,
    pub progress_interval: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            ticks: 10_000,
            glaciation_at: Vec::new(),
            meteorite_at: Vec::new(),
            fit_window: 5_000,
            run_fit: true,
            export_dir: None,
            progress_interval: 5000,
        }
    }
}

/// Final outcome handed to callers/reporting sinks.
pub struct RunOutcome {
    pub diagnostics: SimDiagnostics,
    pub fit: Option<FitResult>,
}

pub fn run_headless(
    cfg: SimulationConfig,
    opts: &HeadlessConfig,
) -> BiosferaResult<RunOutcome> {
    let mut world = WorldState::new(cfg)?;

    log::info!(
        "Headless run started: {} ticks, seed {}, {} prey / {} predators",
        opts.ticks,
        world.config().seed,
        world.prey().len(),
        world.predators().len(),
    );

    let started = Instant::now();
    let mut last_report = Instant::now();
    let mut last_report_tick = 0u64;

    for tick in 0..opts.ticks {
        if opts.glaciation_at.contains(&tick) {
            world.trigger(EventTrigger::Glaciation);
        }
        if opts.meteorite_at.contains(&tick) {
            world.trigger(EventTrigger::Meteorite);
        }
        world.step();

        if opts.progress_interval > 0 && (tick + 1) % opts.progress_interval == 0 {
            let done = tick + 1;
            let total_elapsed = started.elapsed().as_secs_f64().max(1e-6);
            let total_tps = done as f64 / total_elapsed;

            let window_elapsed = last_report.elapsed().as_secs_f64().max(1e-6);
            let window_ticks = done - last_report_tick;
            let window_tps = window_ticks as f64 / window_elapsed;

            let remaining = opts.ticks.saturating_sub(done);
            let eta_secs = if total_tps > 1e-6 {
                remaining as f64 / total_tps
            } else {
                0.0
            };

            log::info!(
                "Headless progress: {}/{} | tps={:.0} (window {:.0}) | ETA={:.1} min | prey={} predators={}",
                done,
                opts.ticks,
                total_tps,
                window_tps,
                eta_secs / 60.0,
                world.prey().len(),
                world.predators().len(),
            );

            last_report = Instant::now();
            last_report_tick = done;
        }
    }

    let diagnostics = SimDiagnostics::from_world(&world);
    diagnostics.log(world.tick());

    // A failed fit aborts reporting of the parameters, never the recorded
    // history: the error is logged and the outcome carries None.
    let fit = if opts.run_fit {
        match fit_from_history(&world, opts.fit_window) {
            Ok(result) => {
                log::info!(
                    "Fitted Lotka-Volterra: r={:.4} a={:.4} b={:.4} d={:.4} (loss {:.6})",
                    result.params.r,
                    result.params.a,
                    result.params.b,
                    result.params.d,
                    result.loss,
                );
                Some(result)
            }
            Err(err) => {
                log::error!("Lotka-Volterra fit failed: {err}");
                None
            }
        }
    } else {
        None
    };

    if let Some(base) = &opts.export_dir {
        let runlog = RunLog::new(base);
        runlog.prepare()?;
        runlog.save_config(world.config())?;
        runlog.export_population_csv(world.history())?;
        runlog.export_events_log(world.event_log())?;
        runlog.export_report(world.config(), &diagnostics, world.history(), fit.as_ref())?;
    }

    Ok(RunOutcome { diagnostics, fit })
}

fn fit_from_history(world: &WorldState, fit_window: usize) -> BiosferaResult<FitResult> {
    let history = world.history();
    let lifespan = history.mean_prey_lifespan().ok_or_else(|| {
        BiosferaError::DegenerateInput(
            "no prey died during the run; characteristic time unavailable".into(),
        )
    })?;
    let window = fit_window.min(history.len());
    fit::fit_lotka_volterra(
        &history.prey_counts[..window],
        &history.predator_counts[..window],
        lifespan,
        &FitOptions::default(),
    )
}
