use crate::domain::HookRunner;
use anyhow::{Context, Result, bail};
use std::process::Command;
use tracing::debug;

/// Runs hooks through `sh -c`, inheriting stdio.
#[derive(Debug, Clone, Default)]
pub struct ShellHookRunner;

impl ShellHookRunner {
    pub fn new() -> Self {
        Self
    }
}

impl HookRunner for ShellHookRunner {
    fn run_hook(&self, command: &str) -> Result<()> {
        if command.trim().is_empty() {
            return Ok(());
        }

        debug!("$ sh -c {:?}", command);
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .with_context(|| format!("executando hook '{command}'"))?;

        if !status.success() {
            bail!("hook '{}' retornou status {:?}", command, status);
        }

        Ok(())
    }
}
