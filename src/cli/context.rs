use crate::domain::{ActionOptions, Cascade, TargetSelection};
use crate::infra::{CliDriver, ShellHookRunner, load_config};
use crate::services::{Deployment, Orchestrator};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Everything the command line decided, passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub target: String,
    pub cascade_dependencies: Cascade,
    pub cascade_affected: Cascade,
    pub recreate: bool,
    pub no_cache: bool,
    pub kill: bool,
    pub no_trunc: bool,
    pub runtime: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            target: String::new(),
            cascade_dependencies: Cascade::None,
            cascade_affected: Cascade::None,
            recreate: false,
            no_cache: false,
            kill: false,
            no_trunc: false,
            runtime: crate::infra::cli_driver::DEFAULT_BINARY.to_string(),
        }
    }
}

impl Options {
    pub fn selection(&self) -> TargetSelection {
        TargetSelection {
            target: self.target.clone(),
            cascade_dependencies: self.cascade_dependencies,
            cascade_affected: self.cascade_affected,
        }
    }

    pub fn action_options(&self) -> ActionOptions {
        ActionOptions {
            recreate: self.recreate,
            no_cache: self.no_cache,
            kill: self.kill,
            no_trunc: self.no_trunc,
        }
    }
}

/// Loads the configuration reachable from `start_dir` and wires it to the
/// configured container runtime and a shell hook runner.
pub fn build_deployment(options: &Options, start_dir: &Path) -> Result<Deployment> {
    let config = load_config(options.config.as_deref(), start_dir)?;
    debug!("Usando runtime '{}'", options.runtime);

    let orchestrator = Orchestrator::new(
        Arc::new(CliDriver::new(options.runtime.as_str())),
        Arc::new(ShellHookRunner::new()),
        options.action_options(),
    );

    Ok(Deployment::new(config.containers, config.groups, orchestrator).with_order(config.order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, DependencyKind};
    use std::fs;

    #[test]
    fn test_options_translate_to_selection_and_action_options() {
        let options = Options {
            target: "web".into(),
            cascade_dependencies: Cascade::All,
            cascade_affected: Cascade::Only(DependencyKind::Link),
            kill: true,
            ..Default::default()
        };

        let selection = options.selection();
        assert_eq!(selection.target, "web");
        assert_eq!(selection.cascade_dependencies, Cascade::All);
        assert_eq!(selection.cascade_affected, Cascade::Only(DependencyKind::Link));

        let action_options = options.action_options();
        assert!(action_options.kill);
        assert!(!action_options.recreate);
    }

    #[test]
    fn test_default_runtime_is_docker() {
        assert_eq!(Options::default().runtime, "docker");
    }

    #[test]
    fn test_build_deployment_from_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("derrick.yml"),
            "containers:\n  web:\n    image: nginx\n    run:\n      link: [\"db:db\"]\n  db:\n    image: postgres\n",
        )
        .unwrap();

        let options = Options {
            target: "web".into(),
            cascade_dependencies: Cascade::All,
            ..Default::default()
        };
        let deployment = build_deployment(&options, temp_dir.path()).unwrap();

        assert_eq!(deployment.containers().len(), 2);
        assert_eq!(
            deployment.plan(Action::Run, &options.selection()).unwrap(),
            vec!["db", "web"]
        );
    }

    #[test]
    fn test_build_deployment_uses_declared_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("derrick.yml"),
            "containers:\n  web:\n    image: nginx\n    run:\n      link: [\"db:db\"]\n  db:\n    image: postgres\n\norder: [web, db]\n",
        )
        .unwrap();

        let deployment = build_deployment(&Options::default(), temp_dir.path()).unwrap();

        assert_eq!(
            deployment.plan(Action::Run, &Options::default().selection()).unwrap(),
            vec!["web", "db"]
        );
    }

    #[test]
    fn test_build_deployment_without_config_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let options = Options {
            config: Some(PathBuf::from("absent.yml")),
            ..Default::default()
        };

        assert!(build_deployment(&options, temp_dir.path()).is_err());
    }
}
