//! # Observability
//!
//! Prometheus metrics for the controller, served by `server`.

pub mod metrics;
