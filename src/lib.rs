//! # Network Add-on Controller Library
//!
//! Core functionality for the network add-on reconciliation controller:
//! chart value computation, manifest extraction and packaging, resource
//! publication and the pass state machine. The watch wiring lives in
//! `main.rs`; tests exercise the pipeline through the capability traits.

pub mod charts;
pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod images;
pub mod observability;
pub mod packaging;
pub mod pipeline;
pub mod server;
pub mod status;
pub mod store;
