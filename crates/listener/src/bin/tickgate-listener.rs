//! tickgate-listener — supervisord event listener throttling a scheduled task.
//!
//! Reads supervisor event tokens on stdin, aggregates ticks into periods,
//! and launches the configured task at most `max_executions` times per
//! cycle. Counters live in fixed-size memory-mapped slots so a listener
//! restart does not lose scheduling state.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;

use tickgate_core::{load_dotenv, TaskConfig, ThrottleConfig};
use tickgate_listener::ProtocolLoop;
use tickgate_store::MmapCounterStore;
use tickgate_throttle::{CommandInvoker, ThrottleEngine};

// ── CLI ─────────────────────────────────────────────────────────────

/// Supervisord event listener that rate-limits a scheduled task.
#[derive(Parser, Debug)]
#[command(name = "tickgate-listener", version, about)]
struct Cli {
    /// Environment identifier forwarded to the task (e.g. "prod").
    env_id: String,

    /// Ticks that make up one scheduling period.
    #[arg(long, env = "TICKGATE_TICKS_PER_PERIOD", default_value_t = 10)]
    ticks_per_period: u64,

    /// Maximum task executions per cycle.
    #[arg(long, env = "TICKGATE_MAX_EXECUTIONS", default_value_t = 10)]
    max_executions: u64,

    /// Periods that make up one full cycle.
    #[arg(long, env = "TICKGATE_TICKS_IN_CYCLE", default_value_t = 1008)]
    ticks_in_cycle: u64,

    /// Directory holding the counter slots.
    #[arg(long, env = "TICKGATE_DATA_DIR", default_value = "/dev/shm/tickgate")]
    data_dir: String,

    /// Command line of the task to launch (program plus arguments).
    #[arg(long, env = "TICKGATE_TASK_COMMAND")]
    task_command: String,

    /// Environment variable that carries ENV_ID into the task.
    #[arg(long, env = "TICKGATE_TASK_ENV_VAR", default_value = "APP_ENV")]
    task_env_var: String,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // The protocol owns stdout; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let throttle = ThrottleConfig {
        ticks_per_period: cli.ticks_per_period,
        max_executions: cli.max_executions,
        ticks_in_cycle: cli.ticks_in_cycle,
        env_id: cli.env_id,
    };
    throttle.validate().context("invalid throttle settings")?;
    throttle.log_summary();

    let task = TaskConfig::from_command_line(&cli.task_command, &cli.task_env_var)
        .context("invalid --task-command")?;

    let store = Arc::new(
        MmapCounterStore::new(&cli.data_dir)
            .with_context(|| format!("opening counter store in {}", cli.data_dir))?,
    );
    let invoker = Arc::new(CommandInvoker::new(task));
    let engine = Arc::new(ThrottleEngine::new(throttle, store, invoker));

    info!("tickgate-listener starting");
    let reader = BufReader::new(tokio::io::stdin());
    let reason = ProtocolLoop::new(engine)
        .run(reader, tokio::io::stdout())
        .await?;
    info!(?reason, "tickgate-listener exited");

    Ok(())
}
