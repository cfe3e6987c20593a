//! Shared custom-resource domain primitives for the MQ benchmark deployment.
//!
//! This crate owns the CloudFormation lifecycle/callback wire contracts and
//! the configuration validation rules. It intentionally excludes AWS SDK and
//! Lambda runtime concerns.

pub mod contract;
pub mod validate;
