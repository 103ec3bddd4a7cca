use crate::domain::{Action, ActionOptions, Container, ContainerDriver};
use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info, warn};

pub const DEFAULT_BINARY: &str = "docker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Missing,
    Stopped,
    Running,
}

impl ContainerState {
    /// Reads the outcome of `inspect --format {{.State.Running}}`; a failed
    /// inspect means the container does not exist.
    pub fn from_inspect(success: bool, stdout: &str) -> Self {
        if !success {
            return Self::Missing;
        }

        match stdout.trim() {
            "true" => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// What `run` does to a container in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStep {
    Skip,
    Start,
    Recreate,
    Create,
}

impl RunStep {
    pub fn for_state(state: ContainerState, recreate: bool) -> Self {
        if recreate {
            return Self::Recreate;
        }

        match state {
            ContainerState::Running => Self::Skip,
            ContainerState::Stopped => Self::Start,
            ContainerState::Missing => Self::Create,
        }
    }
}

/// Drives containers through a docker-compatible command line (`docker`, `podman`).
#[derive(Debug, Clone)]
pub struct CliDriver {
    binary: String,
}

impl CliDriver {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn exec<I, S>(&self, args: I, context: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let status = self.exec_status(args, context)?;
        self.ensure_success(status, context)
    }

    fn exec_status<I, S>(&self, args: I, context: &str) -> Result<ExitStatus>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|item| item.as_ref().to_os_string())
            .collect();
        debug!("$ {} {:?}", self.binary, args);

        Command::new(&self.binary)
            .args(args)
            .status()
            .with_context(|| context.to_string())
    }

    fn ensure_success(&self, status: ExitStatus, context: &str) -> Result<()> {
        if status.success() {
            return Ok(());
        }

        bail!("{} retornou status {:?} ({context})", self.binary, status)
    }

    fn state(&self, name: &str) -> Result<ContainerState> {
        let output = Command::new(&self.binary)
            .args(inspect_args(name))
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("checando estado do container {name}"))?;

        Ok(ContainerState::from_inspect(
            output.status.success(),
            &String::from_utf8_lossy(&output.stdout),
        ))
    }

    fn remove_existing(&self, name: &str) -> Result<()> {
        let status = self.exec_status(["rm", "-f", name], &format!("removendo container {name}"))?;

        if !status.success() {
            warn!("  Não foi possível remover {name} (pode não existir)");
        }

        Ok(())
    }
}

impl Default for CliDriver {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl ContainerDriver for CliDriver {
    fn is_running(&self, name: &str) -> Result<bool> {
        Ok(self.state(name)? == ContainerState::Running)
    }

    fn perform(
        &self,
        action: Action,
        container: &Container,
        alias: &str,
        options: &ActionOptions,
    ) -> Result<()> {
        let name = container.name.as_str();
        match action {
            Action::Provision => self.exec(
                provision_args(container, options),
                &format!("provisionando imagem {}", container.image),
            ),
            Action::Run => {
                let state = if options.recreate {
                    ContainerState::Missing
                } else {
                    self.state(name)?
                };

                match RunStep::for_state(state, options.recreate) {
                    RunStep::Skip => {
                        info!("  {name} já está rodando");
                        Ok(())
                    }
                    RunStep::Start => {
                        self.exec(["start", name], &format!("iniciando container {name}"))
                    }
                    RunStep::Recreate => {
                        self.remove_existing(name)?;
                        self.exec(run_args(container, alias), &format!("executando container {name}"))
                    }
                    RunStep::Create => {
                        self.exec(run_args(container, alias), &format!("executando container {name}"))
                    }
                }
            }
            Action::Push => self.exec(
                ["push", container.image.as_str()],
                &format!("enviando imagem {}", container.image),
            ),
            Action::Remove => self.exec(
                remove_args(name, options),
                &format!("removendo container {name}"),
            ),
            Action::Status => self.exec(
                status_args(name, options),
                &format!("consultando status de {name}"),
            ),
            Action::Start | Action::Stop | Action::Kill | Action::Pause | Action::Unpause => self
                .exec(
                    [action.verb(), name],
                    &format!("executando {} em {name}", action.verb()),
                ),
        }
    }
}

pub fn inspect_args(name: &str) -> Vec<String> {
    vec![
        "inspect".into(),
        "--format".into(),
        "{{.State.Running}}".into(),
        name.into(),
    ]
}

/// Builds the image when a build context is declared, pulls it otherwise.
pub fn provision_args(container: &Container, options: &ActionOptions) -> Vec<String> {
    let Some(build) = &container.build else {
        return vec!["pull".into(), container.image.clone()];
    };

    let mut args: Vec<String> = vec!["build".into()];
    if options.no_cache {
        args.push("--no-cache".into());
    }
    args.push("-t".into());
    args.push(container.image.clone());
    if let Some(file) = &build.file {
        args.push("-f".into());
        args.push(file.to_string_lossy().into_owned());
    }
    args.push(build.context.to_string_lossy().into_owned());
    args
}

pub fn run_args(container: &Container, alias: &str) -> Vec<String> {
    let run = &container.run;
    let mut args: Vec<String> = vec!["run".into(), "--name".into(), container.name.clone()];

    if run.detach.unwrap_or(true) {
        args.push("--detach".into());
    }
    if run.rm.unwrap_or(false) {
        args.push("--rm".into());
    }
    if run.interactive.unwrap_or(false) {
        args.push("-i".into());
    }
    if run.tty.unwrap_or(false) {
        args.push("-t".into());
    }
    if run.privileged.unwrap_or(false) {
        args.push("--privileged".into());
    }
    if let Some(hostname) = &run.hostname {
        args.push("--hostname".into());
        args.push(hostname.clone());
    }
    if let Some(restart) = &run.restart {
        args.push("--restart".into());
        args.push(restart.clone());
    }

    for link in &run.link {
        args.push("--link".into());
        args.push(link.clone());
    }
    if let Some(net) = &run.net {
        args.push("--net".into());
        args.push(net.clone());
    }
    for source in &run.volumes_from {
        args.push("--volumes-from".into());
        args.push(source.clone());
    }
    for port in &run.publish {
        args.push("-p".into());
        args.push(port.clone());
    }
    for env in &run.env {
        args.push("-e".into());
        args.push(env.clone());
    }
    for volume in &run.volume {
        args.push("-v".into());
        args.push(volume.clone());
    }
    if !alias.is_empty() {
        args.push("--network-alias".into());
        args.push(alias.into());
    }

    args.push(container.image.clone());

    if let Some(cmd) = &run.cmd {
        args.extend(cmd.to_args());
    }

    args
}

pub fn remove_args(name: &str, options: &ActionOptions) -> Vec<String> {
    let mut args: Vec<String> = vec!["rm".into()];
    if options.kill {
        args.push("-f".into());
    }
    args.push(name.into());
    args
}

pub fn status_args(name: &str, options: &ActionOptions) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "ps".into(),
        "-a".into(),
        "--filter".into(),
        format!("name=^{name}$"),
    ];
    if options.no_trunc {
        args.push("--no-trunc".into());
    }
    args
}
