// ============================================================================
// runlog.rs — Biosfera
// Run directory management and data export: config snapshot, population CSV,
// event log, and a markdown report with fitted parameters and lifespans.
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::SimulationConfig;
use crate::error::BiosferaResult;
use crate::events::EventLog;
use crate::fit::FitResult;
use crate::history::HistoryRecorder;
use crate::metrics::SimDiagnostics;

/// One run's output directory under `<base>/<date>/run_<stamp>/`.
pub struct RunLog {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub start_time: String,
}

impl RunLog {
    pub fn new(base: &Path) -> Self {
        let now = Local::now();
        let run_id = format!("run_{}", now.format("%Y%m%d_%H%M%S"));
        let run_dir = base.join(now.format("%Y-%m-%d").to_string()).join(&run_id);
        Self {
            run_id,
            run_dir,
            start_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn prepare(&self) -> BiosferaResult<()> {
        fs::create_dir_all(&self.run_dir)?;
        Ok(())
    }

    /// Save config.json for the run.
    pub fn save_config(&self, cfg: &SimulationConfig) -> BiosferaResult<PathBuf> {
        let payload = serde_json::json!({
            "run_id": self.run_id,
            "timestamp": self.start_time,
            "app_version": env!("CARGO_PKG_VERSION"),
            "config": cfg,
        });
        let path = self.run_dir.join("config.json");
        let json = serde_json::to_string_pretty(&payload)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;
        log::info!("Saved config to {:?}", path);
        Ok(path)
    }

    /// Export the per-tick population counts as CSV.
    pub fn export_population_csv(&self, history: &HistoryRecorder) -> BiosferaResult<PathBuf> {
        let path = self.run_dir.join("population.csv");
        let mut file = fs::File::create(&path)?;
        writeln!(file, "tick,prey,predators")?;
        for (tick, (prey, predators)) in history
            .prey_counts
            .iter()
            .zip(&history.predator_counts)
            .enumerate()
        {
            writeln!(file, "{tick},{prey},{predators}")?;
        }
        log::info!("Exported {} population records to {:?}", history.len(), path);
        Ok(path)
    }

    /// Export meteorite ticks and glaciation intervals as a plain log.
    pub fn export_events_log(&self, events: &EventLog) -> BiosferaResult<PathBuf> {
        let path = self.run_dir.join("events.log");
        let mut file = fs::File::create(&path)?;
        for &tick in &events.meteorite_ticks {
            writeln!(file, "tick={tick} METEORITE")?;
        }
        for &(start, end) in &events.glaciation_intervals {
            writeln!(file, "ticks={start}..{end} GLACIATION")?;
        }
        log::info!(
            "Exported {} events to {:?}",
            events.meteorite_ticks.len() + events.glaciation_intervals.len(),
            path
        );
        Ok(path)
    }

    /// Export a full run report (markdown).
    pub fn export_report(
        &self,
        cfg: &SimulationConfig,
        diag: &SimDiagnostics,
        history: &HistoryRecorder,
        fit: Option<&FitResult>,
    ) -> BiosferaResult<PathBuf> {
        let path = self.run_dir.join("report.md");
        let mut file = fs::File::create(&path)?;

        let fit_section = match fit {
            Some(result) => format!(
                "| Coefficient | Value |\n|-------------|-------|\n\
                 | r (prey growth) | {:.4} |\n\
                 | a (capture rate) | {:.4} |\n\
                 | b (conversion rate) | {:.4} |\n\
                 | d (predator death) | {:.4} |\n\n\
                 Objective (MSE, normalized): {:.6}",
                result.params.r, result.params.a, result.params.b, result.params.d, result.loss,
            ),
            None => "No fit was produced for this run.".to_string(),
        };

        let lifespan = |value: Option<f64>| {
            value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1} ticks"))
        };

        let report = format!(
            "# Biosfera Run Report\n\n\
             ## Run Info\n\
             - **Run ID**: {}\n\
             - **Start**: {}\n\
             - **Ticks**: {}\n\
             - **App Version**: {}\n\
             - **World**: {}×{}\n\n\
             ## Parameters\n\
             ```json\n{}\n```\n\n\
             ## Final State\n\
             | Metric | Value |\n|--------|-------|\n\
             | Prey | {} |\n\
             | Predators | {} |\n\
             | Resources | {} |\n\
             | Mean prey lifespan | {} |\n\
             | Mean predator lifespan | {} |\n\
             | Meteorites | {} |\n\n\
             ## Lotka-Volterra Fit\n\
             {}\n",
            self.run_id,
            self.start_time,
            history.len(),
            env!("CARGO_PKG_VERSION"),
            cfg.world_width,
            cfg.world_height,
            serde_json::to_string_pretty(cfg).unwrap_or_default(),
            diag.prey_count,
            diag.predator_count,
            diag.resource_count,
            lifespan(diag.mean_prey_lifespan),
            lifespan(diag.mean_predator_lifespan),
            diag.meteorite_count,
            fit_section,
        );

        file.write_all(report.as_bytes())?;
        log::info!("Exported report to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "biosfera_runlog_{tag}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn population_csv_round_trips() {
        let base = scratch_dir("csv");
        let runlog = RunLog::new(&base);
        runlog.prepare().unwrap();

        let mut history = HistoryRecorder::new();
        history.record_counts(40, 10);
        history.record_counts(41, 9);
        let path = runlog.export_population_csv(&history).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "tick,prey,predators");
        assert_eq!(lines[1], "0,40,10");
        assert_eq!(lines[2], "1,41,9");
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn events_log_lists_both_event_kinds() {
        let base = scratch_dir("events");
        let runlog = RunLog::new(&base);
        runlog.prepare().unwrap();

        let events = EventLog {
            meteorite_ticks: vec![120],
            glaciation_intervals: vec![(200, 600)],
        };
        let path = runlog.export_events_log(&events).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("tick=120 METEORITE"));
        assert!(content.contains("ticks=200..600 GLACIATION"));
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn report_mentions_fit_absence() {
        let base = scratch_dir("report");
        let runlog = RunLog::new(&base);
        runlog.prepare().unwrap();

        let cfg = SimulationConfig::default();
        let world = crate::world::WorldState::new(cfg.clone()).unwrap();
        let diag = SimDiagnostics::from_world(&world);
        let history = HistoryRecorder::new();
        let path = runlog
            .export_report(&cfg, &diag, &history, None)
            .unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("No fit was produced"));
        let _ = fs::remove_dir_all(&base);
    }
}
