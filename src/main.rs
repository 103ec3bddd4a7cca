mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Commands;
use derrick::cli::Options;
use derrick::domain::Cascade;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "derrick",
    about = "Orquestra containers docker/podman respeitando suas dependências"
)]
struct Cli {
    /// Arquivo de configuração (default: derrick.{json,yaml,yml,toml} no diretório atual ou acima)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Grupo ou container alvo (default: grupo "default" ou todos os containers)
    #[arg(short, long, global = true, default_value = "")]
    target: String,

    /// Inclui dependências do alvo: none, all, link, net ou volumesFrom
    #[arg(short = 'd', long, global = true, default_value = "none")]
    cascade_dependencies: Cascade,

    /// Inclui containers afetados pelo alvo: none, all, link, net ou volumesFrom
    #[arg(short = 'a', long, global = true, default_value = "none")]
    cascade_affected: Cascade,

    /// Binário do runtime de containers
    #[arg(long, global = true, env = "DERRICK_RUNTIME", default_value = "docker")]
    runtime: String,

    /// Logs detalhados
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut options = Options {
        config: cli.config,
        target: cli.target,
        cascade_dependencies: cli.cascade_dependencies,
        cascade_affected: cli.cascade_affected,
        runtime: cli.runtime,
        ..Default::default()
    };
    cli.command.apply_flags(&mut options);

    commands::run(cli.command, &options)
}
