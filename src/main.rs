mod calc_daemon;
mod calc_paths;
mod config;
mod daemon_log;
mod rpc;

use anyhow::{Context, Result};
use calc_daemon::script::{parse_script, run_script};
use calc_daemon::CalcClient;
use clap::{Parser, Subcommand};
use config::CalcConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "calc")]
#[command(about = "Remote stack calculator with isolated per-client sessions")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.stack-calc/config.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the calculator daemon
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, 0 for any free port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Play command scripts against the daemon, one session per script
    Run {
        /// Script files (pushValue N, pushOperation op, pop, isEmpty, delayPop N, exit)
        #[arg(required = true)]
        scripts: Vec<PathBuf>,
        /// Daemon address; read from the port file when omitted
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = CalcConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        CliCommand::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            calc_daemon::run_daemon(&config.server).await
        }
        CliCommand::Run { scripts, addr } => run_scripts(&config, scripts, addr).await,
    }
}

async fn run_scripts(config: &CalcConfig, scripts: Vec<PathBuf>, addr: Option<String>) -> Result<()> {
    let mut parsed = Vec::with_capacity(scripts.len());
    for path in scripts {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        let commands =
            parse_script(&source).with_context(|| format!("Invalid script: {}", path.display()))?;
        parsed.push((path, commands));
    }

    let client = match addr {
        Some(addr) => CalcClient::connect(&addr, &config.client).await?,
        None => CalcClient::discover(&config.client).await?,
    };

    let mut handles = Vec::new();
    for (path, commands) in parsed {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let report = run_script(&client, &commands).await;
            (path, report)
        }));
    }

    let mut failed = 0;
    for handle in handles {
        let (path, report) = handle.await.context("Script task panicked")?;
        let name = path.display();
        match report {
            Ok(report) => {
                tracing::debug!(script = %name, session_id = %report.session_id, "script finished");
                for line in &report.lines {
                    println!("[{}] {}", name, line);
                }
            }
            Err(e) => {
                eprintln!("[{}] Error: {:#}", name, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} script(s) could not run", failed);
    }
    Ok(())
}
