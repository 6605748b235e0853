use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use mission_client::MissionClient;
use mission_core::{Config, Session, Strategy};
use mission_loop::{MissionOutcome, SessionSlot};

mod logging;
mod observer;

use logging::init_logging;
use observer::ConsoleObserver;

#[derive(Parser)]
#[command(name = "mission")]
#[command(about = "Submit tasks to the mission execution service and follow their progress")]
#[command(version)]
struct Cli {
    /// Base address of the execution service (overrides config and AGENT_API_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Explicit config file (.json or .toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// User id forwarded with each request
    #[arg(long)]
    user_id: Option<String>,

    /// Give up on the mission after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route the task and follow it to completion
    Run {
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },
    /// Force the streaming agent path
    Stream {
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },
    /// Force the fast search path
    Search {
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },
    /// Show which path a task would take, without contacting the service
    Route {
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },
    /// Start a background run and print its ticket
    Trigger {
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_path(path)?;
            config.apply_env();
            config
        }
        None => Config::new(),
    };

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(user_id) = &cli.user_id {
        config.user_id = Some(user_id.clone());
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = load_config(&cli)?;
    log::debug!("Base URL: {}", config.base_url);

    let client = Arc::new(MissionClient::new(&config)?);

    match &cli.command {
        Commands::Run { task } => run_mission(&cli, client, &task.join(" "), None).await,
        Commands::Stream { task } => {
            run_mission(&cli, client, &task.join(" "), Some(Strategy::General)).await
        }
        Commands::Search { task } => {
            run_mission(&cli, client, &task.join(" "), Some(Strategy::Fast)).await
        }
        Commands::Route { task } => {
            show_route(&client, &task.join(" "));
            Ok(())
        }
        Commands::Trigger { task } => trigger(&client, &task.join(" ")).await,
    }
}

async fn until_timeout(timeout: Option<u64>) {
    match timeout {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => std::future::pending().await,
    }
}

async fn run_mission(
    cli: &Cli,
    client: Arc<MissionClient>,
    task: &str,
    strategy: Option<Strategy>,
) -> anyhow::Result<()> {
    let plan = match strategy {
        Some(strategy) => client.router().plan(strategy),
        None => client.route(task),
    };

    println!(
        "{}",
        format!("🚀 Mission: {} ({} path)", task, plan.strategy).cyan()
    );
    println!("{}", "─".repeat(50).dimmed());

    let slot = SessionSlot::new(client);
    let handle = slot
        .start_with_plan(plan, task, Box::new(ConsoleObserver::new(cli.debug)))
        .await;

    let outcome = tokio::select! {
        outcome = handle.finished() => outcome,
        _ = tokio::signal::ctrl_c() => {
            slot.cancel().await;
            MissionOutcome::Cancelled
        }
        _ = until_timeout(cli.timeout) => {
            log::warn!(
                "[{}] Timed out after {}s",
                handle.mission_id,
                cli.timeout.unwrap_or_default()
            );
            slot.cancel().await;
            MissionOutcome::Cancelled
        }
    };

    println!("{}", "─".repeat(50).dimmed());

    if outcome == MissionOutcome::Cancelled {
        anyhow::bail!("Mission cancelled");
    }

    let Some(session) = slot.snapshot().await else {
        anyhow::bail!("Mission state unavailable");
    };
    print_summary(&session);

    if session.result.is_none() {
        anyhow::bail!("Mission ended without a result");
    }
    Ok(())
}

fn print_summary(session: &Session) {
    if let Some(result) = session.result_text() {
        println!("{}", "📝 Mission result:".cyan());
        println!("{}", result);
    }

    if !session.sources.is_empty() {
        println!();
        println!(
            "{}",
            format!("📚 Sources: {}", session.sources.join(" | ")).dimmed()
        );
    }
}

fn show_route(client: &MissionClient, task: &str) {
    let plan = client.route(task);
    println!("{}", format!("Strategy: {}", plan.strategy).cyan());
    println!("Endpoint: {}", plan.endpoint);
    match client.router().matched_keyword(task) {
        Some(keyword) => println!("{}", format!("Matched keyword: {keyword:?}").dimmed()),
        None => println!("{}", "No keyword matched".dimmed()),
    }
}

async fn trigger(client: &MissionClient, task: &str) -> anyhow::Result<()> {
    let ticket = client.trigger_run(task).await?;
    println!("{}", format!("✅ Status: {}", ticket.status).green());
    if let Some(run_id) = &ticket.run_id {
        println!("Run ID: {}", run_id);
    }
    if let Some(thread_id) = &ticket.thread_id {
        println!("Thread ID: {}", thread_id);
    }
    Ok(())
}
