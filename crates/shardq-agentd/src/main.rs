use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use shardq_core::{Subscribe, Supervisor, build_processors};
use shardq_model::{ControllerKind, ManagerSpec, parse_kind_list};
use shardq_observe::{LoggerConfig, Subscriber, init_local_offset, init_logger};
use shardq_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

mod catalog;
use catalog::DemoCatalog;

/// Comma-separated controller kinds; all kinds when unset.
const ENV_CONTROLLERS: &str = "SHARDQ_CONTROLLERS";
/// Workers per controller.
const ENV_WORKERS: &str = "SHARDQ_WORKERS";
/// Upper bound of the random pause after each dequeue.
const ENV_JITTER_MS: &str = "SHARDQ_JITTER_MS";

const OBJECTS_PER_CONTROLLER: usize = 25;

fn main() -> anyhow::Result<()> {
    // Must run before the runtime spawns its threads.
    init_local_offset();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(run())
}

async fn run() -> anyhow::Result<()> {
    // 1) logger
    let cfg = LoggerConfig::from_env()?;
    init_logger(&cfg)?;

    // 2) controllers and manager settings
    let kinds = match env(ENV_CONTROLLERS) {
        Some(list) => parse_kind_list(&list)?,
        None => ControllerKind::ALL.to_vec(),
    };
    let spec = manager_spec()?;
    info!(controllers = kinds.len(), workers = spec.workers, "agent starting");

    // 3) metrics + subscribers
    let metrics = PrometheusMetrics::new()?;
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Subscriber)];

    // 4) processors
    let catalog = DemoCatalog::new(OBJECTS_PER_CONTROLLER);
    let mut supervisor = Supervisor::new(spec)
        .with_metrics(Arc::new(metrics.clone()))
        .with_subscribers(subscribers);
    for processor in build_processors(&catalog, &kinds)? {
        supervisor.add(processor);
    }

    // 5) run until interrupted
    let token = CancellationToken::new();
    tokio::spawn({
        let token = token.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("interrupt received, shutting down"),
                Err(e) => warn!(error = %e, "cannot listen for interrupt, shutting down"),
            }
            token.cancel();
        }
    });
    supervisor.run(token).await?;

    // 6) final metrics snapshot
    let mut out = Vec::new();
    TextEncoder::new().encode(&metrics.gather(), &mut out)?;
    println!("{}", String::from_utf8_lossy(&out));

    info!("agent stopped");
    Ok(())
}

fn env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn manager_spec() -> anyhow::Result<ManagerSpec> {
    let mut spec = ManagerSpec::default();
    if let Some(v) = env(ENV_WORKERS) {
        spec.workers = v.trim().parse().with_context(|| format!("{ENV_WORKERS}={v}"))?;
    }
    if let Some(v) = env(ENV_JITTER_MS) {
        spec.dequeue_jitter_ms = v.trim().parse().with_context(|| format!("{ENV_JITTER_MS}={v}"))?;
    }
    spec.validate()?;
    Ok(spec)
}
