mod deployment;
mod orchestrator;

pub use deployment::Deployment;
pub use orchestrator::{ExecutionReport, Orchestrator};
