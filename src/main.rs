//! relay-sim - drive the relay against simulated backends
//!
//! Registers one simulated backend per provider name, each behind its own
//! dispatcher, runs a batch of prompts through the enhancer and prints what
//! happened plus the resulting health table.

#![allow(missing_docs)]

use anyhow::{Context, anyhow};
use clap::Parser;
use llm_relay::utils::init_logging;
use llm_relay::{
    Config, EnhancedOptions, ErrorKind, Gateway, GatewayEnhancer, ProviderRegistry,
    QueuedProvider, RawFailure, SelectionStrategy, SimulatedProvider,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "relay-sim", version, about = "Run prompts through the relay against simulated providers")]
struct Cli {
    /// Relay configuration file (YAML); defaults plus RELAY_* variables otherwise
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Task type used for model and priority lookup
    #[arg(short, long, default_value = "text-generation")]
    task: String,

    /// Selection strategy
    #[arg(short, long, default_value = "priority")]
    strategy: SelectionStrategy,

    /// Number of prompts to send
    #[arg(short = 'n', long, default_value_t = 20)]
    requests: usize,

    /// Providers to simulate, in registration order; every provider in the model table otherwise
    #[arg(long, value_delimiter = ',')]
    providers: Vec<String>,

    /// Failure rate for one provider as NAME=RATE, repeatable
    #[arg(long = "fail", value_parser = parse_failure_rate)]
    failures: Vec<(String, f64)>,

    /// Minimum simulated latency in milliseconds
    #[arg(long, default_value_t = 20)]
    min_latency_ms: u64,

    /// Maximum simulated latency in milliseconds
    #[arg(long, default_value_t = 250)]
    max_latency_ms: u64,

    /// Return this error kind for every prompt instead of calling providers
    #[arg(long)]
    simulate: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

fn parse_failure_rate(value: &str) -> Result<(String, f64), String> {
    let (name, rate) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=RATE, got '{}'", value))?;
    let rate: f64 = rate
        .parse()
        .map_err(|e| format!("invalid rate '{}': {}", rate, e))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(format!("rate must be between 0 and 1, got {}", rate));
    }
    Ok((name.to_string(), rate))
}

fn parse_error_kind(value: &str) -> anyhow::Result<ErrorKind> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| anyhow!("unknown error kind '{}'", value))
}

/// Mix of probe-sized and full-sized prompts, like a load test would send
fn prompts(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("ping {}", i),
            1 => format!("TEST_LOAD request {}", i),
            _ => format!(
                "Request {}: summarize the trade-offs between optimistic and pessimistic \
                 concurrency control for a write-heavy workload, with examples.",
                i
            ),
        })
        .collect()
}

fn build_registry(cli: &Cli, config: &Config) -> ProviderRegistry {
    let names = if cli.providers.is_empty() {
        config.models().providers()
    } else {
        cli.providers.clone()
    };

    let rates: HashMap<&str, f64> = cli
        .failures
        .iter()
        .map(|(name, rate)| (name.as_str(), *rate))
        .collect();

    names.iter().fold(ProviderRegistry::new(), |registry, name| {
        let rate = rates.get(name.as_str()).copied().unwrap_or(0.0);
        let backend = SimulatedProvider::new(name.as_str())
            .with_latency(
                Duration::from_millis(cli.min_latency_ms),
                Duration::from_millis(cli.max_latency_ms),
            )
            .with_failure_rate(rate)
            .with_failure(RawFailure::network(
                "ECONNRESET",
                format!("{} dropped the connection", name),
            ))
            .with_models(config.models().models_for(name));
        registry.with_provider(Arc::new(QueuedProvider::new(
            backend,
            config.relay.dispatcher.clone(),
        )))
    })
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::from_env().context("failed to load configuration from environment")?,
    };
    if cli.json_logs {
        config.relay.logging.json = true;
    }
    init_logging(config.logging()).context("failed to initialize logging")?;

    let mut options = EnhancedOptions::default().with_strategy(cli.strategy);
    if let Some(kind) = &cli.simulate {
        options = options.simulate(parse_error_kind(kind)?);
    }

    let registry = build_registry(&cli, &config);
    info!(providers = ?registry.names(), task_type = %cli.task, "Starting simulation");
    let enhancer = GatewayEnhancer::new(Arc::new(Gateway::new(&config.relay, registry)));

    let inputs = prompts(cli.requests);
    let started = Instant::now();
    let responses = enhancer
        .process_batch_with_smart_fallback(&cli.task, &inputs, &options)
        .await;
    let elapsed = started.elapsed();

    for (index, response) in responses.iter().enumerate() {
        let outcome = match response.error_kind {
            None => "ok".to_string(),
            Some(kind) => kind.to_string(),
        };
        println!(
            "{:>4}  {:<20} {:<10} {:<26} cache={:<5} failover={:<5} {:>8.1}ms",
            index,
            outcome,
            response.provider,
            response.model,
            response.from_cache,
            response.was_failover,
            response.processing_time_ms.unwrap_or_default(),
        );
    }

    let failed = responses.iter().filter(|r| r.is_failure()).count();
    let failovers = responses.iter().filter(|r| r.was_failover).count();
    println!(
        "\n{}/{} succeeded, {} via failover, {:.2}s total",
        responses.len() - failed,
        responses.len(),
        failovers,
        elapsed.as_secs_f64()
    );

    println!("\nHealth:");
    println!(
        "{}",
        serde_json::to_string_pretty(&enhancer.providers_health())
            .context("failed to serialize health snapshot")?
    );

    println!("\nRanking by health:");
    for (name, score) in enhancer.providers_by_health_score() {
        println!("  {:<10} {:>7.2}", name, score);
    }

    println!("\nRanking for {} ({}):", cli.task, cli.strategy);
    for (name, score) in enhancer.gateway().ranked_providers_with(&cli.task, cli.strategy) {
        println!("  {:<10} {:>7.2}", name, score);
    }

    let stats = enhancer.gateway().cache_stats();
    println!(
        "\nCache: {} entries, {} hits, {} misses",
        stats.entries, stats.hits, stats.misses
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
