use anyhow::{Result, bail};
use clap::Subcommand;
use derrick::cli::{Options, build_deployment, render_plan, render_report};
use derrick::domain::Action;
use derrick::services::{Deployment, ExecutionReport};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provisiona e executa os containers do alvo
    Lift {
        /// Remove containers existentes antes de executar
        #[arg(long)]
        recreate: bool,
        /// Constrói imagens sem cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Baixa ou constrói as imagens do alvo
    Provision {
        #[arg(long)]
        no_cache: bool,
    },
    /// Executa os containers do alvo (dependências primeiro)
    Run {
        #[arg(long)]
        recreate: bool,
    },
    /// Inicia containers existentes
    Start,
    /// Para containers (dependentes primeiro)
    Stop,
    /// Mata containers (dependentes primeiro)
    Kill,
    /// Pausa containers
    Pause,
    /// Retoma containers pausados
    Unpause,
    /// Remove containers
    Rm {
        /// Força a remoção de containers em execução
        #[arg(long)]
        kill: bool,
    },
    /// Envia as imagens do alvo para o registry
    Push,
    /// Mostra o estado dos containers do alvo
    Status {
        #[arg(long)]
        no_trunc: bool,
    },
    /// Mostra o alvo resolvido e a ordem de execução
    Graph,
    /// Mostra a versão
    Version,
}

impl Commands {
    /// Folds subcommand flags into the shared options.
    pub fn apply_flags(&self, options: &mut Options) {
        match self {
            Commands::Lift { recreate, no_cache } => {
                options.recreate |= *recreate;
                options.no_cache |= *no_cache;
            }
            Commands::Provision { no_cache } => options.no_cache |= *no_cache,
            Commands::Run { recreate } => options.recreate |= *recreate,
            Commands::Rm { kill } => options.kill |= *kill,
            Commands::Status { no_trunc } => options.no_trunc |= *no_trunc,
            _ => {}
        }
    }

    fn action(&self) -> Option<Action> {
        match self {
            Commands::Provision { .. } => Some(Action::Provision),
            Commands::Run { .. } => Some(Action::Run),
            Commands::Start => Some(Action::Start),
            Commands::Stop => Some(Action::Stop),
            Commands::Kill => Some(Action::Kill),
            Commands::Pause => Some(Action::Pause),
            Commands::Unpause => Some(Action::Unpause),
            Commands::Rm { .. } => Some(Action::Remove),
            Commands::Push => Some(Action::Push),
            Commands::Status { .. } => Some(Action::Status),
            Commands::Lift { .. } | Commands::Graph | Commands::Version => None,
        }
    }
}

pub fn run(command: Commands, options: &Options) -> Result<()> {
    if let Commands::Version = command {
        println!("derrick {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let deployment = build_deployment(options, &cwd)?;
    let selection = options.selection();

    let report = match (&command, command.action()) {
        (Commands::Graph, _) => return graph(&deployment, options),
        (_, Some(action)) => deployment.execute(action, &selection)?,
        _ => deployment.lift(&selection)?,
    };

    finish(report)
}

fn graph(deployment: &Deployment, options: &Options) -> Result<()> {
    let selection = options.selection();
    let target = deployment.target(&selection)?;
    let order = deployment.plan(Action::Run, &selection)?;

    print!("{}", render_plan(deployment.containers(), &target, &order));
    Ok(())
}

fn finish(report: ExecutionReport) -> Result<()> {
    if report.is_success() {
        info!(" {} container(s) concluídos", report.completed.len());
        return Ok(());
    }

    eprint!("{}", render_report(&report));
    bail!("{} container(s) falharam", report.failed.len())
}
