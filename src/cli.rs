// Command-line surface and dispatch

use crate::cleanup::{CleanupOptions, CleanupOutcome, Orchestrator, report_system_info};
use crate::config::AppConfig;
use crate::gateway::{DockerGateway, Gateway};
use crate::inspect::{Stdout, inspect_container, shutdown_signal};
use crate::proxy::{DEFAULT_MIRRORS, ProxyTarget, configure_mirrors};
use crate::runcmd::generate_run_command;
use crate::version;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "doke",
    version,
    about = "Docker companion: clean up unused resources, watch containers live"
)]
pub struct Cli {
    /// Config file (default: ./doke.toml when present)
    #[arg(long, global = true, env = "DOKE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove stopped containers and unused images, networks and volumes
    Clear {
        /// Prune every unused image, not only dangling ones
        #[arg(short, long)]
        all: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
        /// Show engine and disk usage information instead of cleaning
        #[arg(short, long)]
        info: bool,
    },
    /// Show live resource usage and logs of a container
    Inspect { container: String },
    /// Add registry mirrors to the engine config and restart the engine
    Proxy {
        /// Mirror URL to add instead of the built-in list (repeatable)
        #[arg(long = "mirror", value_name = "URL")]
        mirrors: Vec<String>,
    },
    /// Print a `docker run` command that recreates a container
    #[command(visible_alias = "c")]
    Command { container: String },
    /// Print the doke version
    #[command(visible_alias = "v")]
    Version,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Version => {
            println!("{} version {}", version::NAME, version::VERSION);
            Ok(())
        }
        Commands::Clear { all, force, info } => {
            let gateway = connect(&config)?;
            let mut out = std::io::stdout();
            if info {
                report_system_info(gateway.as_ref(), &mut out).await?;
                return Ok(());
            }
            let options = CleanupOptions {
                include_all_images: all,
                skip_confirmation: force,
            };
            let mut input = std::io::stdin().lock();
            match Orchestrator::new(gateway)
                .perform_cleanup(options, &mut input, &mut out)
                .await?
            {
                CleanupOutcome::Completed(stats) => {
                    tracing::debug!(removed = stats.total_removed(), "clear finished")
                }
                CleanupOutcome::Cancelled => tracing::debug!("clear cancelled"),
            }
            Ok(())
        }
        Commands::Inspect { container } => {
            let shutdown = shutdown_signal()?;
            let gateway = connect(&config)?;
            inspect_container(
                gateway,
                &container,
                &config.inspect,
                Arc::new(Stdout),
                shutdown,
            )
            .await
        }
        Commands::Proxy { mirrors } => {
            let target = ProxyTarget::detect()?;
            let mirrors: Vec<&str> = if mirrors.is_empty() {
                DEFAULT_MIRRORS.to_vec()
            } else {
                mirrors.iter().map(String::as_str).collect()
            };
            configure_mirrors(&target, &mirrors, &mut std::io::stdout()).await
        }
        Commands::Command { container } => {
            let gateway = connect(&config)?;
            let inspected = gateway
                .inspect_container(&container)
                .await
                .context("failed to inspect container")?;
            println!("{}", generate_run_command(&inspected));
            Ok(())
        }
    }
}

fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn Gateway>> {
    let gateway =
        DockerGateway::connect(&config.docker).context("failed to create Docker client")?;
    Ok(Arc::new(gateway))
}
