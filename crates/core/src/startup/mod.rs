//! Application startup orchestration

pub mod advisory;
pub mod fault;
pub mod guard;
pub mod orchestrator;
pub mod ports;

pub use advisory::{find_task_killer, AdvisoryOutcome, TaskKillerAdvisor};
pub use fault::{install_panic_reporter, UncaughtPanic};
pub use guard::StartupGuard;
pub use orchestrator::{
    StartupDeps, StartupJobs, StartupOrchestrator, StartupOutcome, StartupReport, StartupSettings,
};
