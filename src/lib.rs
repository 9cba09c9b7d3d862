//! Core library for the `trackload` CLI.
//!
//! This crate provides the internal building blocks used by the binary: CLI
//! argument types, the mover and watcher worker state machines, metrics
//! aggregation, and the CSV output sink. The primary user-facing interface is
//! the `trackload` command-line application; library APIs may evolve as the
//! harness grows.
pub mod app;
pub mod args;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod shutdown;
pub mod workers;
