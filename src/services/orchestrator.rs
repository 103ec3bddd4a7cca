use crate::domain::{
    Action, ActionOptions, Container, ContainerDriver, ContainerMap, HookRunner, HookStage,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of applying one action over an ordered list of containers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub completed: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: ExecutionReport) {
        self.completed.extend(other.completed);
        self.failed.extend(other.failed);
    }
}

/// Drives container lifecycle transitions, wrapping each driver call with hooks
pub struct Orchestrator {
    driver: Arc<dyn ContainerDriver>,
    hooks: Arc<dyn HookRunner>,
    options: ActionOptions,
}

impl Orchestrator {
    pub fn new(
        driver: Arc<dyn ContainerDriver>,
        hooks: Arc<dyn HookRunner>,
        options: ActionOptions,
    ) -> Self {
        Self {
            driver,
            hooks,
            options,
        }
    }

    pub fn driver(&self) -> &Arc<dyn ContainerDriver> {
        &self.driver
    }

    pub fn run(&self, container: &Container, containers: &ContainerMap, alias: &str) -> Result<()> {
        self.apply(Action::Run, container, containers, alias)
    }

    pub fn start(&self, container: &Container, containers: &ContainerMap, alias: &str) -> Result<()> {
        self.apply(Action::Start, container, containers, alias)
    }

    pub fn stop(&self, container: &Container) -> Result<()> {
        self.apply(Action::Stop, container, &ContainerMap::new(), "")
    }

    pub fn kill(&self, container: &Container) -> Result<()> {
        self.apply(Action::Kill, container, &ContainerMap::new(), "")
    }

    pub fn pause(&self, container: &Container) -> Result<()> {
        self.apply(Action::Pause, container, &ContainerMap::new(), "")
    }

    pub fn unpause(&self, container: &Container) -> Result<()> {
        self.apply(Action::Unpause, container, &ContainerMap::new(), "")
    }

    pub fn remove(&self, container: &Container) -> Result<()> {
        self.apply(Action::Remove, container, &ContainerMap::new(), "")
    }

    pub fn push(&self, container: &Container) -> Result<()> {
        self.apply(Action::Push, container, &ContainerMap::new(), "")
    }

    pub fn provision(&self, container: &Container) -> Result<()> {
        self.apply(Action::Provision, container, &ContainerMap::new(), "")
    }

    pub fn status(&self, container: &Container) -> Result<()> {
        self.apply(Action::Status, container, &ContainerMap::new(), "")
    }

    /// Applies `action` to one container.
    ///
    /// For run-class actions every link dependency found running gets its
    /// pre-link hook before the driver call and its post-link hook after it.
    /// Link dependencies missing from `containers` are skipped. Post hooks
    /// only run when the driver call succeeded.
    pub fn apply(
        &self,
        action: Action,
        container: &Container,
        containers: &ContainerMap,
        alias: &str,
    ) -> Result<()> {
        let hook_pair = action.hook_pair();

        if let Some((pre, _)) = hook_pair {
            self.run_hook(container, pre);
        }

        let notified = if action.notifies_links() {
            self.running_links(container, containers)
        } else {
            Vec::new()
        };

        for link in &notified {
            self.run_hook(link, HookStage::PreLink);
        }

        debug!("{} {}", action, container.name);
        self.driver
            .perform(action, container, alias, &self.options)?;

        for link in &notified {
            self.run_hook(link, HookStage::PostLink);
        }

        if let Some((_, post)) = hook_pair {
            self.run_hook(container, post);
        }

        Ok(())
    }

    /// Applies `action` to each named container in turn.
    ///
    /// A failing container is logged and recorded; the remaining ones still run.
    pub fn execute(&self, action: Action, order: &[String], containers: &ContainerMap) -> ExecutionReport {
        self.execute_guarded(action, order, containers, |_| None)
    }

    /// Like [`Orchestrator::execute`], but asks `guard` first. A returned
    /// reason fails that container without calling the driver.
    pub fn execute_guarded<G>(
        &self,
        action: Action,
        order: &[String],
        containers: &ContainerMap,
        guard: G,
    ) -> ExecutionReport
    where
        G: Fn(&Container) -> Option<String>,
    {
        let mut report = ExecutionReport::default();

        if order.is_empty() {
            return report;
        }

        info!(" Executando {} em {} container(s)...", action, order.len());

        for name in order {
            let Some(container) = containers.get(name) else {
                warn!("  Container '{}' não declarado, ignorando", name);
                continue;
            };

            if let Some(reason) = guard(container) {
                error!("  {} não pode executar {}: {}", name, action, reason);
                report.failed.push((name.clone(), reason));
                continue;
            }

            match self.apply(action, container, containers, "") {
                Ok(_) => {
                    debug!("{} concluído para {}", action, name);
                    report.completed.push(name.clone());
                }

                Err(e) => {
                    error!("  Falha ao executar {} em {}: {}", action, name, e);
                    report.failed.push((name.clone(), e.to_string()));
                }
            }
        }

        report
    }

    /// Link and net dependencies present in `containers` that are not running.
    pub fn stopped_requirements(&self, container: &Container, containers: &ContainerMap) -> Vec<String> {
        let deps = container.dependencies();

        deps.all
            .iter()
            .filter(|name| deps.must_run(name) && containers.contains(name))
            .filter(|name| !self.is_running(name))
            .cloned()
            .collect()
    }

    fn running_links<'a>(&self, container: &Container, containers: &'a ContainerMap) -> Vec<&'a Container> {
        container
            .dependencies()
            .link
            .iter()
            .filter_map(|name| containers.get(name))
            .filter(|link| self.is_running(&link.name))
            .collect()
    }

    fn is_running(&self, name: &str) -> bool {
        match self.driver.is_running(name) {
            Ok(running) => running,
            Err(e) => {
                warn!("  Não foi possível consultar o estado de {}: {}", name, e);
                false
            }
        }
    }

    fn run_hook(&self, container: &Container, stage: HookStage) {
        let Some(command) = container.hook(stage) else {
            return;
        };

        debug!("Hook {} de {}: {}", stage.as_str(), container.name, command);

        if let Err(e) = self.hooks.run_hook(command) {
            warn!(
                "  Hook {} de {} falhou: {}",
                stage.as_str(),
                container.name,
                e
            );
        }
    }
}
