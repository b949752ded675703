//! Logging and metrics for nutritrack
//!
//! - Structured logging with `tracing`, compact or JSON, optional log files
//! - An in-process metrics registry, mirrored to the `metrics` facade
//! - [`MetricsObserver`], which plugs both into the core `Observer` hooks

mod logging;
mod registry;
mod observer;

pub use crate::logging::{init_with_config, session_id, LogGuard};
pub use crate::registry::{metrics, HistogramStats, MetricsRegistry, Timer};
pub use crate::observer::MetricsObserver;
