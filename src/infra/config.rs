use crate::domain::{BuildSpec, CommandSpec, Container, ContainerMap, Groups, Hooks, RunSpec};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File names looked up, in order, in each candidate directory.
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    "derrick.json",
    "derrick.yaml",
    "derrick.yml",
    "derrick.toml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Picks the decoder from the extension; anything unknown is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    #[serde(default)]
    pub containers: BTreeMap<String, ContainerConfig>,
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
    /// Explicit container order; overrides the dependency order when set.
    #[serde(default)]
    pub order: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub build: Option<BuildSpec>,
    #[serde(default)]
    pub run: RunSpec,
    #[serde(default)]
    pub hooks: Hooks,
}

/// Containers and groups decoded from one configuration file
#[derive(Debug)]
pub struct Config {
    pub path: PathBuf,
    pub containers: ContainerMap,
    pub groups: Groups,
    pub order: Vec<String>,
}

/// Candidate file names: just the explicit one when given
pub fn config_files(explicit: Option<&Path>) -> Vec<PathBuf> {
    match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => CONFIG_FILE_NAMES.iter().map(PathBuf::from).collect(),
    }
}

/// Locates the configuration file, walking up from `start_dir`.
pub fn find_config_file(explicit: Option<&Path>, start_dir: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            start_dir.join(path)
        };
        if !path.exists() {
            bail!("Arquivo de configuração {:?} não encontrado", path);
        }
        return Ok(path);
    }

    for dir in start_dir.ancestors() {
        for name in config_files(None) {
            let candidate = dir.join(name);
            if candidate.is_file() {
                debug!("Configuração encontrada em {:?}", candidate);
                return Ok(candidate);
            }
        }
    }

    bail!(
        "Nenhum arquivo de configuração ({}) encontrado a partir de {:?}",
        CONFIG_FILE_NAMES.join(", "),
        start_dir
    )
}

pub fn load_config(explicit: Option<&Path>, start_dir: &Path) -> Result<Config> {
    let path = find_config_file(explicit, start_dir)?;
    let content = fs::read_to_string(&path).with_context(|| format!("lendo {:?}", path))?;
    let config = parse_config(&content, &path)?;

    info!(
        "  Carregados {} container(s) e {} grupo(s) de {:?}",
        config.containers.len(),
        config.groups.len(),
        path
    );

    Ok(config)
}

/// Decodes, expands and validates a configuration document.
///
/// Relative paths (build contexts, `./` bind mounts) are resolved against
/// the directory holding `path`.
pub fn parse_config(content: &str, path: &Path) -> Result<Config> {
    let document = decode(content, ConfigFormat::from_path(path), path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut containers = ContainerMap::new();
    for (raw_name, raw) in document.containers {
        let name = expand_env(&raw_name);
        validate_name(&name).with_context(|| format!("em {:?}", path))?;

        let image = expand_env(&raw.image);
        if image.trim().is_empty() {
            bail!("Container '{}' sem campo 'image' em {:?}", name, path);
        }

        let mut container = Container::new(
            name.clone(),
            image,
            expand_run_spec(raw.run, base_dir),
            expand_hooks(raw.hooks),
        );
        if let Some(build) = raw.build {
            container = container.with_build(resolve_build(build, base_dir));
        }

        if containers.insert(container).is_some() {
            bail!("Container '{}' declarado mais de uma vez em {:?}", name, path);
        }
    }

    let mut groups = Groups::new();
    for (raw_name, members) in document.groups {
        let name = expand_env(&raw_name);
        if containers.contains(&name) {
            bail!(
                "Grupo '{}' tem o mesmo nome de um container em {:?}",
                name,
                path
            );
        }
        groups.insert(name, members.iter().map(|m| expand_env(m)).collect());
    }

    let order = expand_all(document.order);
    if let Some(unknown) = order.iter().find(|name| !containers.contains(name)) {
        warn!("Ordem declarada cita container desconhecido '{}' em {:?}", unknown, path);
    }

    Ok(Config {
        path: path.to_path_buf(),
        containers,
        groups,
        order,
    })
}

fn decode(content: &str, format: ConfigFormat, path: &Path) -> Result<ConfigDocument> {
    if content.trim().is_empty() {
        return Ok(ConfigDocument::default());
    }

    let document = match format {
        ConfigFormat::Json => {
            serde_json::from_str(content).with_context(|| format!("parse de {:?}", path))?
        }
        ConfigFormat::Yaml => {
            serde_yml::from_str(content).with_context(|| format!("parse de {:?}", path))?
        }
        ConfigFormat::Toml => {
            toml::from_str(content).with_context(|| format!("parse de {:?}", path))?
        }
    };

    Ok(document)
}

fn validate_name(name: &str) -> Result<()> {
    let Some(first_char) = name.chars().next() else {
        bail!("Nome de container vazio encontrado");
    };

    if !first_char.is_alphanumeric() {
        bail!("Nome de container '{}' deve começar com letra ou número", name);
    }

    for c in name.chars() {
        if !c.is_alphanumeric() && c != '_' && c != '.' && c != '-' {
            bail!("Nome de container '{}' contém caractere inválido '{}'", name, c);
        }
    }

    Ok(())
}

/// Substitutes `$VAR` and `${VAR}`; unset variables become empty.
pub fn expand_env(value: &str) -> String {
    shellexpand::env_with_context_no_errors(value, |var| {
        Some(std::env::var(var).unwrap_or_default())
    })
    .into_owned()
}

fn expand_all(values: Vec<String>) -> Vec<String> {
    values.iter().map(|v| expand_env(v)).collect()
}

fn expand_opt(value: Option<String>) -> Option<String> {
    value.map(|v| expand_env(&v))
}

fn expand_run_spec(run: RunSpec, base_dir: &Path) -> RunSpec {
    RunSpec {
        link: expand_all(run.link),
        net: expand_opt(run.net),
        volumes_from: expand_all(run.volumes_from),
        publish: expand_all(run.publish),
        env: expand_all(run.env),
        volume: run
            .volume
            .iter()
            .map(|v| resolve_volume(&expand_env(v), base_dir))
            .collect(),
        hostname: expand_opt(run.hostname),
        restart: expand_opt(run.restart),
        cmd: run.cmd.map(|cmd| match cmd {
            CommandSpec::Line(line) => CommandSpec::Line(expand_env(&line)),
            CommandSpec::Args(args) => CommandSpec::Args(expand_all(args)),
        }),
        ..run
    }
}

fn expand_hooks(hooks: Hooks) -> Hooks {
    Hooks {
        pre_start: expand_opt(hooks.pre_start),
        post_start: expand_opt(hooks.post_start),
        pre_stop: expand_opt(hooks.pre_stop),
        post_stop: expand_opt(hooks.post_stop),
        pre_link: expand_opt(hooks.pre_link),
        post_link: expand_opt(hooks.post_link),
    }
}

fn resolve_build(build: BuildSpec, base_dir: &Path) -> BuildSpec {
    let context = PathBuf::from(expand_env(&build.context.to_string_lossy()));
    let context = if context.is_relative() {
        base_dir.join(context)
    } else {
        context
    };

    BuildSpec {
        context,
        file: build
            .file
            .map(|file| PathBuf::from(expand_env(&file.to_string_lossy()))),
    }
}

/// Resolves `~` and `./` host paths of a bind mount; named volumes and
/// container-only paths are left alone.
fn resolve_volume(volume: &str, base_dir: &Path) -> String {
    let Some((host, rest)) = volume.split_once(':') else {
        return volume.to_string();
    };

    let host = shellexpand::tilde(host).into_owned();
    if host.starts_with("./") || host.starts_with("../") || host == "." {
        format!("{}:{}", base_dir.join(&host).display(), rest)
    } else {
        format!("{host}:{rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptBool;

    #[test]
    fn config_files_default_names() {
        assert_eq!(config_files(None).len(), 4);

        let files = config_files(Some(Path::new("some/file.yml")));
        assert_eq!(files, vec![PathBuf::from("some/file.yml")]);
    }

    #[test]
    fn parses_yaml_config() {
        let yaml = r#"
containers:
  web:
    image: nginx:1.25
    run:
      link: ["db:database"]
      publish: ["8080:80"]
      detach: true
    hooks:
      post-start: echo web up
  db:
    image: postgres:15
    run:
      volumes-from: [data]
  data:
    image: busybox
groups:
  default: [web, db]
"#;
        let config = parse_config(yaml, Path::new("/srv/app/derrick.yml")).unwrap();

        assert_eq!(config.containers.len(), 3);
        let web = config.containers.get("web").unwrap();
        assert_eq!(web.dependencies().link, vec!["db"]);
        assert_eq!(web.run.detach, OptBool::True);
        assert_eq!(web.hooks.post_start.as_deref(), Some("echo web up"));
        assert_eq!(
            config.containers.get("db").unwrap().dependencies().volumes_from,
            vec!["data"]
        );
        assert_eq!(config.groups["default"], vec!["web", "db"]);
    }

    #[test]
    fn parses_json_config() {
        let json = r#"{
            "containers": {
                "app": {"image": "app:latest", "run": {"net": "container:proxy", "cmd": "serve --port 80"}},
                "proxy": {"image": "envoy"}
            }
        }"#;
        let config = parse_config(json, Path::new("derrick.json")).unwrap();

        let app = config.containers.get("app").unwrap();
        assert_eq!(app.dependencies().net.as_deref(), Some("proxy"));
        assert_eq!(
            app.run.cmd.as_ref().unwrap().to_args(),
            vec!["serve", "--port", "80"]
        );
        assert!(config.groups.is_empty());
    }

    #[test]
    fn parses_toml_config() {
        let toml = r#"
[containers.cache]
image = "redis:7"

[containers.worker]
image = "worker"
run = { link = ["cache:redis"], rm = false }

[groups]
jobs = ["worker", "cache"]
"#;
        let config = parse_config(toml, Path::new("derrick.toml")).unwrap();

        let worker = config.containers.get("worker").unwrap();
        assert_eq!(worker.dependencies().all, vec!["cache"]);
        assert_eq!(worker.run.rm, OptBool::False);
        assert_eq!(config.groups["jobs"], vec!["worker", "cache"]);
    }

    #[test]
    fn expands_environment_variables() {
        unsafe {
            std::env::set_var("DERRICK_TEST_TAG", "15");
            std::env::set_var("DERRICK_TEST_NAME", "pg");
            std::env::remove_var("DERRICK_TEST_UNSET");
        }
        let yaml = r#"
containers:
  $DERRICK_TEST_NAME:
    image: postgres:${DERRICK_TEST_TAG}
    run:
      env: ["SUFFIX=$DERRICK_TEST_UNSET"]
groups:
  default: [$DERRICK_TEST_NAME]
"#;
        let config = parse_config(yaml, Path::new("derrick.yml")).unwrap();

        let pg = config.containers.get("pg").unwrap();
        assert_eq!(pg.image, "postgres:15");
        assert_eq!(pg.run.env, vec!["SUFFIX="]);
        assert_eq!(config.groups["default"], vec!["pg"]);
    }

    #[test]
    fn resolves_relative_paths_against_config_dir() {
        let yaml = r#"
containers:
  app:
    image: app
    build:
      context: ./app
    run:
      volume: ["./src:/src", "/abs:/abs", "named:/data", "/only"]
"#;
        let config = parse_config(yaml, Path::new("/srv/project/derrick.yml")).unwrap();
        let app = config.containers.get("app").unwrap();

        assert_eq!(
            app.build.as_ref().unwrap().context,
            PathBuf::from("/srv/project/./app")
        );
        assert_eq!(
            app.run.volume,
            vec!["/srv/project/./src:/src", "/abs:/abs", "named:/data", "/only"]
        );
    }

    #[test]
    fn parses_declared_order() {
        unsafe {
            std::env::set_var("DERRICK_TEST_FIRST", "b");
        }
        let yaml = r#"
containers:
  a:
    image: a
  b:
    image: b
order: [$DERRICK_TEST_FIRST, a]
"#;
        let config = parse_config(yaml, Path::new("derrick.yml")).unwrap();
        assert_eq!(config.order, vec!["b", "a"]);

        let config = parse_config("containers:\n  a:\n    image: a\n", Path::new("derrick.yml")).unwrap();
        assert!(config.order.is_empty());
    }

    #[test]
    fn rejects_missing_image() {
        let yaml = "containers:\n  web:\n    run:\n      publish: [\"80:80\"]\n";
        let err = parse_config(yaml, Path::new("derrick.yml")).unwrap_err();
        assert!(err.to_string().contains("sem campo 'image'"));
    }

    #[test]
    fn rejects_invalid_names() {
        let yaml = "containers:\n  -web:\n    image: nginx\n";
        assert!(parse_config(yaml, Path::new("derrick.yml")).is_err());

        let yaml = "containers:\n  we/b:\n    image: nginx\n";
        assert!(parse_config(yaml, Path::new("derrick.yml")).is_err());
    }

    #[test]
    fn rejects_group_shadowing_container() {
        let yaml = "containers:\n  web:\n    image: nginx\ngroups:\n  web: [web]\n";
        let err = parse_config(yaml, Path::new("derrick.yml")).unwrap_err();
        assert!(err.to_string().contains("mesmo nome"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let yaml = "containers:\n  web:\n    image: nginx\n    run:\n      links: [db]\n";
        assert!(parse_config(yaml, Path::new("derrick.yml")).is_err());
    }

    #[test]
    fn empty_file_is_allowed() {
        let config = parse_config("   \n", Path::new("derrick.yml")).unwrap();
        assert!(config.containers.is_empty());
    }

    #[test]
    fn finds_config_in_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("derrick.yaml"), "containers: {}\n").unwrap();

        let found = find_config_file(None, &nested).unwrap();
        assert_eq!(found, temp_dir.path().join("derrick.yaml"));
    }

    #[test]
    fn explicit_config_must_exist() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = find_config_file(Some(Path::new("missing.yml")), temp_dir.path());
        assert!(result.is_err());
    }
}
