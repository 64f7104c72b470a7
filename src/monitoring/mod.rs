#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Observability (metrics, structured logging setup).

pub mod logging;
/// Prometheus metrics.
pub mod metrics;
