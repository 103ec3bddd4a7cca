pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{Action, Cascade, Container, ContainerMap, TargetSelection};
pub use error::{DerrickError, Result};
pub use infra::{CliDriver, ShellHookRunner};
pub use services::{Deployment, ExecutionReport, Orchestrator};
