// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod logging;
pub mod relay;
pub mod store;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, Command};
use crate::config::{load_and_validate, load_relay_config, ProjectFile};
use crate::dag::{Schedule, TaskGraph};
use crate::relay::{spawn_relay, ClientMessage, InboundMessage, RelayHandle, RelayState};
use crate::store::{recompute_project, CriticalPathRow, MemoryScheduleStore, ScheduleStore};
use crate::types::OutputFormat;

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Schedule {
            project,
            format,
            critical_only,
        } => run_schedule(Path::new(&project), format, critical_only),
        Command::Serve { config, bind } => {
            run_serve(config.as_deref().map(Path::new), bind.as_deref()).await
        }
    }
}

/// Load a project file, compute its schedule through the store workflow and
/// print it.
pub fn run_schedule(path: &Path, format: OutputFormat, critical_only: bool) -> Result<()> {
    let file = load_and_validate(path)
        .with_context(|| format!("loading project file {}", path.display()))?;
    let project_id = file.project.id;

    let mut store = MemoryScheduleStore::from_project_file(&file);
    let schedule = recompute_project(&mut store, project_id)?;

    let rows: Vec<CriticalPathRow> = store
        .schedule(project_id)?
        .into_iter()
        .filter(|row| !critical_only || row.is_critical())
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let graph = TaskGraph::build(&file.task_records())?;
            print_table(&file, &schedule, &graph, &rows);
        }
    }

    Ok(())
}

/// Run the relay until Ctrl-C.
pub async fn run_serve(config_path: Option<&Path>, bind: Option<&str>) -> Result<()> {
    let mut cfg = load_relay_config(config_path)?;
    if let Some(bind) = bind {
        cfg.bind = bind
            .parse()
            .with_context(|| format!("--bind '{bind}' is not a socket address"))?;
    }

    let (relay, inbound_rx, hub) = spawn_relay(cfg.outbox_capacity);
    tokio::spawn(log_inbound(inbound_rx));

    let state = RelayState {
        relay: relay.clone(),
        send_timeout: cfg.send_timeout,
    };

    let listener = TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    info!(addr = %cfg.bind, path = crate::relay::COLLABORATION_PATH, "relay listening");

    axum::serve(listener, crate::relay::router(state))
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c(), relay))
        .await?;

    hub.await?;
    info!("relay exited");
    Ok(())
}

/// Resolves once `signal` fires and the relay hub has been told to stop.
///
/// If the signal cannot be installed this never resolves, so the server keeps
/// running instead of stopping right after start.
pub async fn shutdown_on<F>(signal: F, relay: RelayHandle)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("failed to listen for Ctrl+C: {e}; relay will not shut down gracefully");
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received; shutting down");
    let _ = relay.shutdown().await;
}

/// Application side of the relay's inbound stream.
///
/// Persistence lives outside this binary, so accepted messages are only
/// logged; a host application would upsert the task here and call
/// [`store::recompute_project`].
async fn log_inbound(mut rx: mpsc::Receiver<InboundMessage>) {
    while let Some(msg) = rx.recv().await {
        match &msg.message {
            ClientMessage::JoinProject { project_id } => {
                debug!(connection = %msg.connection, project = project_id, "join_project");
            }
            ClientMessage::TaskUpdate { .. } => {
                info!(
                    connection = %msg.connection,
                    project = ?msg.project,
                    user = ?msg.user_id,
                    "task_update received; project schedule is stale"
                );
            }
            ClientMessage::ResourceAssignment { .. } => {
                info!(
                    connection = %msg.connection,
                    project = ?msg.project,
                    user = ?msg.user_id,
                    "resource_assignment received"
                );
            }
        }
    }
}

/// Human-readable schedule: one line per task, then the critical chain.
fn print_table(file: &ProjectFile, schedule: &Schedule, graph: &TaskGraph, rows: &[CriticalPathRow]) {
    let project = &file.project;
    let finish_date = project.start_date + chrono::Days::new(schedule.duration().max(0) as u64);

    println!("critpath schedule");
    println!("  project: {} (id {})", project.name, project.id);
    println!("  start:   {}", project.start_date);
    println!("  finish:  {} ({} days)", finish_date, schedule.duration());
    println!();

    println!(
        "  {:>5}  {:<24} {:>4} {:>12} {:>12} {:>12} {:>12} {:>5}",
        "id", "name", "dur", "early start", "early end", "late start", "late end", "slack"
    );
    for row in rows {
        let name = file
            .task
            .iter()
            .find(|t| t.id == row.task_id)
            .map(|t| t.name.as_str())
            .unwrap_or("?");
        let duration = graph.duration_of(row.task_id).unwrap_or(0);
        let marker = if row.is_critical() { " *" } else { "" };
        println!(
            "  {:>5}  {:<24} {:>4} {:>12} {:>12} {:>12} {:>12} {:>5}{}",
            row.task_id,
            name,
            duration,
            row.earliest_start.date_naive().to_string(),
            row.earliest_finish.date_naive().to_string(),
            row.latest_start.date_naive().to_string(),
            row.latest_finish.date_naive().to_string(),
            row.slack,
            marker
        );
    }

    let path = schedule.critical_path(graph);
    if !path.is_empty() {
        println!();
        let chain: Vec<String> = path.iter().map(|id| id.to_string()).collect();
        println!("critical path: {}", chain.join(" -> "));
    }
}
