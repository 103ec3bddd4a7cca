use super::{Dependencies, OptBool};
use serde::Deserialize;
use std::path::PathBuf;

/// Points in a container's lifecycle where a user hook may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    PreStart,
    PostStart,
    PreStop,
    PostStop,
    PreLink,
    PostLink,
}

impl HookStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreStart => "pre-start",
            Self::PostStart => "post-start",
            Self::PreStop => "pre-stop",
            Self::PostStop => "post-stop",
            Self::PreLink => "pre-link",
            Self::PostLink => "post-link",
        }
    }
}

/// External commands declared for each hook stage.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Hooks {
    pub pre_start: Option<String>,
    pub post_start: Option<String>,
    pub pre_stop: Option<String>,
    pub post_stop: Option<String>,
    pub pre_link: Option<String>,
    pub post_link: Option<String>,
}

impl Hooks {
    /// The command for `stage`, if one is declared and non-empty.
    pub fn command(&self, stage: HookStage) -> Option<&str> {
        let command = match stage {
            HookStage::PreStart => &self.pre_start,
            HookStage::PostStart => &self.post_start,
            HookStage::PreStop => &self.pre_stop,
            HookStage::PostStop => &self.post_stop,
            HookStage::PreLink => &self.pre_link,
            HookStage::PostLink => &self.post_link,
        };
        command.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// A container command, either a single line split on whitespace or an explicit argument list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandSpec {
    Line(String),
    Args(Vec<String>),
}

impl CommandSpec {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::Line(line) => line.split_whitespace().map(str::to_string).collect(),
            Self::Args(args) => args.clone(),
        }
    }
}

/// Raw run parameters as declared in the configuration.
///
/// Only `link`, `net` and `volumes_from` feed the dependency graph; the rest
/// is passed through to the driver.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunSpec {
    #[serde(default)]
    pub link: Vec<String>,
    #[serde(default)]
    pub net: Option<String>,
    #[serde(default)]
    pub volumes_from: Vec<String>,
    #[serde(default)]
    pub publish: Vec<String>,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub volume: Vec<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub restart: Option<String>,
    #[serde(default)]
    pub cmd: Option<CommandSpec>,
    #[serde(default)]
    pub detach: OptBool,
    #[serde(default)]
    pub rm: OptBool,
    #[serde(default)]
    pub interactive: OptBool,
    #[serde(default)]
    pub tty: OptBool,
    #[serde(default)]
    pub privileged: OptBool,
}

/// Where to build the image from instead of pulling it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildSpec {
    pub context: PathBuf,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub image: String,
    pub build: Option<BuildSpec>,
    pub run: RunSpec,
    pub hooks: Hooks,
    dependencies: Dependencies,
}

impl Container {
    pub fn new(name: impl Into<String>, image: impl Into<String>, run: RunSpec, hooks: Hooks) -> Self {
        let dependencies = Dependencies::extract(&run);
        Self {
            name: name.into(),
            image: image.into(),
            build: None,
            run,
            hooks,
            dependencies,
        }
    }

    pub fn with_build(mut self, build: BuildSpec) -> Self {
        self.build = Some(build);
        self
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn hook(&self, stage: HookStage) -> Option<&str> {
        self.hooks.command(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_hooks_count_as_undefined() {
        let hooks = Hooks {
            pre_start: Some("  ".into()),
            post_start: Some("notify".into()),
            ..Default::default()
        };

        assert_eq!(hooks.command(HookStage::PreStart), None);
        assert_eq!(hooks.command(HookStage::PostStart), Some("notify"));
        assert_eq!(hooks.command(HookStage::PreLink), None);
    }

    #[test]
    fn command_line_is_split_on_whitespace() {
        let cmd = CommandSpec::Line("bundle exec rails s -p 3000".into());
        assert_eq!(cmd.to_args(), vec!["bundle", "exec", "rails", "s", "-p", "3000"]);

        let cmd = CommandSpec::Args(vec!["echo".into(), "hello world".into()]);
        assert_eq!(cmd.to_args(), vec!["echo", "hello world"]);
    }

    #[test]
    fn container_computes_dependencies_once() {
        let run = RunSpec {
            link: vec!["db:database".into()],
            ..Default::default()
        };
        let container = Container::new("web", "nginx", run, Hooks::default());

        assert_eq!(container.dependencies().all, vec!["db"]);
        assert!(container.build.is_none());
    }

    #[test]
    fn run_spec_decodes_kebab_case_keys() {
        let yaml = r#"
link: ["db:db"]
volumes-from: [data]
net: "container:proxy"
cmd: ["echo", "ok"]
detach: false
"#;
        let run: RunSpec = serde_yml::from_str(yaml).unwrap();

        assert_eq!(run.volumes_from, vec!["data"]);
        assert_eq!(run.detach, OptBool::False);
        assert_eq!(run.rm, OptBool::Undefined);
        assert_eq!(run.cmd, Some(CommandSpec::Args(vec!["echo".into(), "ok".into()])));
    }
}
