mod config;
mod diff;
mod executor;
mod pass;
mod scheduler;

pub use config::SyncConfig;
pub use diff::{Action, SyncPlan, diff};
pub use executor::{ActionFailure, Executor, PassReport};
pub use pass::{PassOutcome, SkipReason, SyncRunner, run_pass};
pub use scheduler::{FixedRate, PassGate, PassGuard, PassRunner, Scheduler, TickOutcome};
