//! # Controller
//!
//! Watch-facing layer: translates watch events into reconciliation passes
//! and pass errors into requeue behavior.

pub mod reconciler;

pub use reconciler::{error_policy, reconcile, Reconciler, ReconcilerError};
