use crate::domain::{Action, ActionOptions, Container, ContainerDriver, HookRunner, Hooks, RunSpec};
use anyhow::{Result, bail};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Shared, ordered record of hook and driver calls
pub type CallLog = Arc<RwLock<Vec<String>>>;

pub fn new_call_log() -> CallLog {
    Arc::new(RwLock::new(Vec::new()))
}

/// A container linking to each of `links` under its own name
pub fn linked(name: &str, links: &[&str]) -> Container {
    let run = RunSpec {
        link: links.iter().map(|l| format!("{l}:{l}")).collect(),
        ..Default::default()
    };
    Container::new(name, format!("{name}-img"), run, Hooks::default())
}

#[derive(Debug)]
pub struct MockDriver {
    running: RwLock<HashSet<String>>,
    log: CallLog,
    queries: RwLock<Vec<String>>,
    aliases: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::with_log(new_call_log())
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            running: RwLock::new(HashSet::new()),
            log,
            queries: RwLock::new(Vec::new()),
            aliases: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
        }
    }

    pub fn set_running(&self, name: &str, running: bool) {
        let mut set = self.running.write().unwrap();
        if running {
            set.insert(name.to_string());
        } else {
            set.remove(name);
        }
    }

    pub fn running(&self, name: &str) -> bool {
        self.running.read().unwrap().contains(name)
    }

    /// Fail either a whole verb (`"run"`) or one call (`"run:web"`)
    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.log.read().unwrap().clone()
    }

    pub fn get_queries(&self) -> Vec<String> {
        self.queries.read().unwrap().clone()
    }

    pub fn get_aliases(&self) -> Vec<String> {
        self.aliases.read().unwrap().clone()
    }

    fn check_fail(&self, verb: &str, call: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == verb || fail_on == call {
                bail!("Mock failure on: {}", call);
            }
        }
        Ok(())
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerDriver for MockDriver {
    fn is_running(&self, name: &str) -> Result<bool> {
        self.queries.write().unwrap().push(name.to_string());
        self.check_fail("is_running", &format!("is_running:{name}"))?;
        Ok(self.running(name))
    }

    fn perform(
        &self,
        action: Action,
        container: &Container,
        alias: &str,
        _options: &ActionOptions,
    ) -> Result<()> {
        let call = format!("{}:{}", action.verb(), container.name);
        self.log.write().unwrap().push(call.clone());
        self.aliases.write().unwrap().push(alias.to_string());
        self.check_fail(action.verb(), &call)?;

        match action {
            Action::Run | Action::Start | Action::Unpause => self.set_running(&container.name, true),
            Action::Stop | Action::Kill | Action::Remove => self.set_running(&container.name, false),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingHookRunner {
    log: CallLog,
    failing: RwLock<HashSet<String>>,
}

impl RecordingHookRunner {
    pub fn new() -> Self {
        Self::with_log(new_call_log())
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            failing: RwLock::new(HashSet::new()),
        }
    }

    pub fn fail_on(&self, command: &str) {
        self.failing.write().unwrap().insert(command.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.log.read().unwrap().clone()
    }
}

impl Default for RecordingHookRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRunner for RecordingHookRunner {
    fn run_hook(&self, command: &str) -> Result<()> {
        self.log.write().unwrap().push(command.to_string());
        if self.failing.read().unwrap().contains(command) {
            bail!("hook '{}' exited with status 1", command);
        }
        Ok(())
    }
}
