//! AWS-oriented adapters and handlers for the MQ benchmark custom resources.
//!
//! This crate owns runtime integration details (Lambda entrypoints, the ECS
//! and parameter-store adapters, callback delivery) on top of the wire
//! contracts and validation rules in `mq_bench_provision_core`.

pub mod adapters;
pub mod callback;
pub mod handlers;
pub mod logging;
