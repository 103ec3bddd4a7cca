use super::{Action, ActionOptions, Container};
use anyhow::Result;
use std::fmt::Debug;

/// Trait for the container engine that carries out actions
pub trait ContainerDriver: Send + Sync + Debug {
    /// Point-in-time query of whether a container is running
    fn is_running(&self, name: &str) -> Result<bool>;

    /// Perform `action` on a container. `alias` is only meaningful to the driver.
    fn perform(
        &self,
        action: Action,
        container: &Container,
        alias: &str,
        options: &ActionOptions,
    ) -> Result<()>;
}

/// Trait for executing user hooks
pub trait HookRunner: Send + Sync + Debug {
    /// Run `command` to completion
    fn run_hook(&self, command: &str) -> Result<()>;
}
