//! Prometheus backend for manager metrics.
//!
//! [`PrometheusMetrics`] implements [`shardq_core::MetricsBackend`]; hand it to
//! `ManagerBuilder::with_metrics` or `Supervisor::with_metrics`.
//!
//! ```rust
//! use std::sync::Arc;
//! use shardq_core::{MetricsHandle, Supervisor};
//! use shardq_model::NamespacedName;
//! use shardq_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: MetricsHandle = Arc::new(metrics.clone());
//! let _supervisor = Supervisor::<NamespacedName>::new(Default::default()).with_metrics(handle);
//!
//! let mut body = Vec::new();
//! TextEncoder::new().encode(&metrics.gather(), &mut body)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `shardq_process_started_total{processor}`
//! - `shardq_process_completed_total{processor, outcome}`
//! - `shardq_process_duration_seconds{processor}`
//! - `shardq_duplicate_deferred_total{processor}`
//!
//! No HTTP endpoint is provided; expose [`PrometheusMetrics::gather`] through
//! whatever server the application already runs.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
