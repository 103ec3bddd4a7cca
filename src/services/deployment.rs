use super::{ExecutionReport, Orchestrator};
use crate::domain::{Action, ContainerMap, Groups, TargetResolver, TargetSelection};
use crate::error::Result;
use tracing::{debug, info, warn};

/// A loaded set of containers and groups, ready to act on a target.
pub struct Deployment {
    containers: ContainerMap,
    groups: Groups,
    order: Vec<String>,
    orchestrator: Orchestrator,
}

impl Deployment {
    pub fn new(containers: ContainerMap, groups: Groups, orchestrator: Orchestrator) -> Self {
        Self {
            containers,
            groups,
            order: Vec::new(),
            orchestrator,
        }
    }

    /// Replaces the computed dependency order with a declared one.
    ///
    /// Targeted containers missing from `order` are skipped.
    pub fn with_order(mut self, order: Vec<String>) -> Self {
        self.order = order;
        self
    }

    pub fn containers(&self) -> &ContainerMap {
        &self.containers
    }

    /// Resolved target for `selection`, sorted by name.
    pub fn target(&self, selection: &TargetSelection) -> Result<Vec<String>> {
        TargetResolver::new(&self.containers, &self.groups).determine_target(selection)
    }

    /// Containers `action` will touch, in the order it will touch them.
    ///
    /// A declared order wins over the dependency order. Actions that force
    /// an order fall back to alphabetical order when the dependencies cannot
    /// be ordered.
    ///
    /// # Errors
    ///
    /// Fails on an unknown target, or when the targeted containers form a
    /// cycle and `action` needs a dependency order.
    pub fn plan(&self, action: Action, selection: &TargetSelection) -> Result<Vec<String>> {
        let target = self.target(selection)?;
        let reversed = action.direction().is_reversed();

        let order = if self.order.is_empty() {
            let subset = self.containers.subset(&target, false, false);
            match subset.order(reversed) {
                Ok(order) => order,
                Err(e) if action.forces_order() => {
                    warn!("  {}; {} segue em ordem alfabética", e, action);
                    subset.alphabetical(reversed)
                }
                Err(e) => return Err(e),
            }
        } else {
            self.declared_order(&target, reversed)
        };

        debug!("Plano de {}: {:?}", action, order);
        Ok(order)
    }

    fn declared_order(&self, target: &[String], reversed: bool) -> Vec<String> {
        let mut order: Vec<String> = Vec::with_capacity(target.len());
        for name in &self.order {
            if target.contains(name) && !order.contains(name) {
                order.push(name.clone());
            }
        }

        for name in target.iter().filter(|name| !order.contains(name)) {
            warn!("  Container '{}' fora da ordem declarada, ignorando", name);
        }

        if reversed {
            order.reverse();
        }
        order
    }

    /// Plans and applies `action`.
    ///
    /// Run-class actions refuse containers whose link or net dependencies
    /// are declared but not running; those are reported as failed.
    pub fn execute(&self, action: Action, selection: &TargetSelection) -> Result<ExecutionReport> {
        let order = self.plan(action, selection)?;

        if !action.notifies_links() {
            return Ok(self.orchestrator.execute(action, &order, &self.containers));
        }

        Ok(self
            .orchestrator
            .execute_guarded(action, &order, &self.containers, |container| {
                let stopped = self
                    .orchestrator
                    .stopped_requirements(container, &self.containers);
                (!stopped.is_empty()).then(|| {
                    format!("dependências precisam estar rodando: {}", stopped.join(", "))
                })
            }))
    }

    /// Provisions images, then runs the containers.
    pub fn lift(&self, selection: &TargetSelection) -> Result<ExecutionReport> {
        info!(" Provisionando e executando containers...");

        let mut report = self.execute(Action::Provision, selection)?;
        report.merge(self.execute(Action::Run, selection)?);
        Ok(report)
    }
}
