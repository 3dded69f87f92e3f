// ============================================================================
// lib.rs — Biosfera
// Agent-based predator/prey ecology with environmental shocks and offline
// Lotka-Volterra parameter recovery.
// ============================================================================

pub mod behavior;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod fit;
pub mod headless;
pub mod history;
pub mod metrics;
pub mod runlog;
pub mod world;

pub use config::SimulationConfig;
pub use error::{BiosferaError, BiosferaResult};
pub use events::EventTrigger;
pub use fit::{fit_lotka_volterra, FitOptions, FitResult, LotkaVolterra};
pub use history::HistoryRecorder;
pub use world::WorldState;
