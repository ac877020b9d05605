//! AgentOps CLI - manage agents and read performance reports from a local store.

use std::path::PathBuf;
use std::sync::Arc;

use agentops_core::{AgentId, AgentRecord, AgentStatus, MetricSample, RecordFilter};
use agentops_reporting::{
    capacity::{DEFAULT_GROWTH_RATE, DEFAULT_HORIZON_DAYS},
    PerformanceMonitor, Sensitivity,
};
use agentops_storage::{DataStore, JsonStore};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "agentops")]
#[command(about = "Agent management and performance reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage path for AgentOps data
    #[arg(long, env = "AGENTOPS_DATA_DIR", default_value = ".agentops")]
    data_dir: PathBuf,

    /// Tenant to act as
    #[arg(long, env = "AGENTOPS_TENANT", default_value = "default")]
    tenant: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage agents
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Full performance report
    Report {
        /// Window such as 24h, 7d or 2w
        #[arg(long, default_value = "24h")]
        timeframe: String,
    },
    /// Anomalous metric samples
    Anomalies {
        /// Window such as 24h, 7d or 2w
        #[arg(long, default_value = "24h")]
        timeframe: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        sensitivity: String,
    },
    /// System health score
    Health,
    /// Capacity projection
    Capacity {
        /// Growth per 30 days, e.g. 0.1 for 10%
        #[arg(long, default_value_t = DEFAULT_GROWTH_RATE)]
        growth_rate: f64,
        /// Projection horizon in days
        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        days: u32,
    },
    /// Record a metric sample for an agent
    RecordSample {
        /// Agent ID
        agent: String,
        /// Metric type
        #[arg(long = "type", default_value = agentops_core::RESPONSE_TIME)]
        metric_type: String,
        /// Sample value
        #[arg(long, value_parser = parse_finite)]
        value: f64,
        /// Unit of the value
        #[arg(long, default_value = "ms")]
        unit: String,
    },
}

#[derive(Subcommand)]
enum AgentCommands {
    /// List agents
    List,
    /// Register an agent (starts in deploying)
    Add {
        /// Display name
        name: String,
        /// Agent kind
        #[arg(long = "type", default_value = "sentiment-analysis")]
        agent_type: String,
    },
    /// Remove an agent
    Remove {
        /// Agent ID
        id: String,
    },
    /// Change an agent's lifecycle status
    SetStatus {
        /// Agent ID
        id: String,
        /// deploying, active, error or inactive
        status: String,
    },
}

/// Sample values must be finite; NaN and infinities cannot be stored as JSON numbers.
fn parse_finite(raw: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("value must be a finite number, got {raw}"))
    }
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store: Arc<dyn DataStore> = Arc::new(JsonStore::new(&cli.data_dir).await?);
    debug!(data_dir = %cli.data_dir.display(), "Opened store");

    let output = run(cli.command, &cli.tenant, store).await?;
    println!("{output}");
    Ok(())
}

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn parse_agent_id(raw: &str) -> Result<AgentId> {
    raw.parse().map_err(|_| anyhow!("Invalid agent ID: {raw}"))
}

async fn load_owned(store: &dyn DataStore, tenant: &str, raw_id: &str) -> Result<AgentRecord> {
    let id = parse_agent_id(raw_id)?;
    match store.load_agent(id).await? {
        Some(agent) if agent.tenant_id == tenant => Ok(agent),
        _ => Err(anyhow!("Agent not found: {id}")),
    }
}

async fn run(command: Commands, tenant: &str, store: Arc<dyn DataStore>) -> Result<String> {
    let monitor = PerformanceMonitor::new(store.clone());

    match command {
        Commands::Agents { command } => run_agents(command, tenant, store.as_ref()).await,
        Commands::Report { timeframe } => pretty(&monitor.report(tenant, &timeframe).await?),
        Commands::Anomalies { timeframe, sensitivity } => {
            let sensitivity: Sensitivity = sensitivity.parse()?;
            pretty(&monitor.anomalies(tenant, &timeframe, sensitivity).await?)
        }
        Commands::Health => pretty(&monitor.health(tenant).await?),
        Commands::Capacity { growth_rate, days } => pretty(&monitor.capacity(tenant, growth_rate, days).await?),
        Commands::RecordSample {
            agent,
            metric_type,
            value,
            unit,
        } => {
            let agent = load_owned(store.as_ref(), tenant, &agent).await?;
            let sample = MetricSample::new(agent.id, tenant, metric_type, value, unit);
            store.record_sample(&sample).await?;
            Ok(format!("Recorded {} = {} {} for {}", sample.metric_type, sample.value, sample.unit, agent.id))
        }
    }
}

async fn run_agents(command: AgentCommands, tenant: &str, store: &dyn DataStore) -> Result<String> {
    match command {
        AgentCommands::List => {
            let agents = store.fetch_agents(&RecordFilter::tenant(tenant)).await?;
            let mut lines = vec![format!("Agents ({})", agents.len())];
            for agent in agents {
                lines.push(format!(
                    "  {} | {} | {} - {}",
                    agent.id, agent.status, agent.agent_type, agent.name
                ));
            }
            Ok(lines.join("\n"))
        }
        AgentCommands::Add { name, agent_type } => {
            if name.trim().is_empty() {
                return Err(anyhow!("Agent name must not be empty"));
            }
            let agent = AgentRecord::new(tenant, name.trim(), agent_type);
            store.save_agent(&agent).await?;
            Ok(format!("Added agent: {} - {}", agent.id, agent.name))
        }
        AgentCommands::Remove { id } => {
            let agent = load_owned(store, tenant, &id).await?;
            store.delete_agent(agent.id).await?;
            Ok(format!("Removed agent: {}", agent.id))
        }
        AgentCommands::SetStatus { id, status } => {
            let status: AgentStatus = status.parse()?;
            let mut agent = load_owned(store, tenant, &id).await?;
            agent.transition_to(status)?;
            store.save_agent(&agent).await?;
            Ok(format!("Agent {} is now {}", agent.id, agent.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["agentops"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    async fn store() -> (tempfile::TempDir, Arc<dyn DataStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();
        (dir, Arc::new(store))
    }

    fn id_from(output: &str) -> String {
        output
            .trim_start_matches("Added agent: ")
            .split(' ')
            .next()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_agent_lifecycle() {
        let (_dir, store) = store().await;

        let added = run(parse(&["agents", "add", "Sentiment"]), "acme", store.clone())
            .await
            .unwrap();
        let id = id_from(&added);

        let out = run(parse(&["agents", "set-status", &id, "active"]), "acme", store.clone())
            .await
            .unwrap();
        assert!(out.ends_with("is now active"));

        // active -> deploying is not a valid transition
        assert!(run(parse(&["agents", "set-status", &id, "deploying"]), "acme", store.clone())
            .await
            .is_err());

        let listed = run(parse(&["agents", "list"]), "acme", store.clone()).await.unwrap();
        assert!(listed.starts_with("Agents (1)"));
        let other = run(parse(&["agents", "list"]), "globex", store.clone()).await.unwrap();
        assert!(other.starts_with("Agents (0)"));

        run(parse(&["agents", "remove", &id]), "acme", store.clone()).await.unwrap();
        let listed = run(parse(&["agents", "list"]), "acme", store).await.unwrap();
        assert!(listed.starts_with("Agents (0)"));
    }

    #[tokio::test]
    async fn test_record_sample_and_report() {
        let (_dir, store) = store().await;
        let added = run(parse(&["agents", "add", "Sentiment"]), "acme", store.clone())
            .await
            .unwrap();
        let id = id_from(&added);

        run(parse(&["record-sample", &id, "--value", "250"]), "acme", store.clone())
            .await
            .unwrap();
        // unknown to another tenant
        assert!(run(parse(&["record-sample", &id, "--value", "1"]), "globex", store.clone())
            .await
            .is_err());

        let report = run(parse(&["report", "--timeframe", "1h"]), "acme", store.clone())
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(json["timeframe"], "1h");
        assert_eq!(json["summary"]["total_metrics"], 1);
        assert_eq!(json["summary"]["avg_response_time_ms"], 250.0);
    }

    #[tokio::test]
    async fn test_unknown_sensitivity_rejected() {
        let (_dir, store) = store().await;
        assert!(run(parse(&["anomalies", "--sensitivity", "extreme"]), "acme", store)
            .await
            .is_err());
    }

    #[test]
    fn test_record_sample_rejects_non_finite_values() {
        for raw in ["NaN", "inf", "-inf"] {
            let parsed = Cli::try_parse_from(["agentops", "record-sample", "01ARZ3NDEKTSV4RRFFQ69G5FAV", "--value", raw]);
            assert!(parsed.is_err(), "{raw} should be rejected");
        }
        match parse(&["record-sample", "01ARZ3NDEKTSV4RRFFQ69G5FAV", "--value", "12.5"]) {
            Commands::RecordSample { value, .. } => assert_eq!(value, 12.5),
            _ => panic!("expected record-sample command"),
        }
    }

    #[test]
    fn test_default_log_filter_is_valid() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_capacity_defaults() {
        match parse(&["capacity"]) {
            Commands::Capacity { growth_rate, days } => {
                assert_eq!(growth_rate, DEFAULT_GROWTH_RATE);
                assert_eq!(days, DEFAULT_HORIZON_DAYS);
            }
            _ => panic!("expected capacity command"),
        }
    }
}
