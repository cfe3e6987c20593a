//! Syntax rules for user-supplied deployment configuration.
//!
//! Every rule is a pure predicate; a failure must abort the enclosing
//! provisioning action before any resource mutation happens.

use std::sync::LazyLock;

use regex::Regex;

use crate::contract::{ValidationError, MAX_WORKER_TASKS};

/// Broker sizes the deployment accepts.
pub const ALLOWED_BROKER_INSTANCE_TYPES: &[&str] = &[
    "mq.m4.large",
    "mq.m5.large",
    "mq.m5.xlarge",
    "mq.m5.2xlarge",
    "mq.m5.4xlarge",
];

// Optional registry host, then namespace and repository name segments.
static REPOSITORY_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-z0-9]+(?:[._-][a-z0-9]+)*\.)?[a-z0-9][a-z0-9-]{0,62}(?:\.[a-z]{2,})?/[a-z0-9-_]+/[a-z0-9-_]+$",
    )
    .expect("repository url pattern should compile")
});

static IMAGE_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("image tag pattern should compile"));

pub fn validate_broker_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() < 2 {
        return Err(ValidationError::new(
            "Username must be at least 2 characters long",
        ));
    }
    if username.contains([' ', ',', ':', '=']) {
        return Err(ValidationError::new(
            "Username cannot contain spaces, commas, colons, or equal signs",
        ));
    }
    Ok(())
}

pub fn validate_repository_url(repository_url: &str) -> Result<(), ValidationError> {
    if repository_url.is_empty() {
        return Err(ValidationError::new("container_repo_url must be provided"));
    }
    if !REPOSITORY_URL_REGEX.is_match(repository_url) {
        return Err(ValidationError::new("Invalid container_repo_url format"));
    }
    Ok(())
}

pub fn validate_image_tag(repository_tag: &str) -> Result<(), ValidationError> {
    if repository_tag.is_empty() {
        return Err(ValidationError::new("container_repo_tag must be provided"));
    }
    if !IMAGE_TAG_REGEX.is_match(repository_tag) {
        return Err(ValidationError::new("Invalid container_repo_tag format"));
    }
    Ok(())
}

pub fn validate_broker_instance_type(instance_type: &str) -> Result<(), ValidationError> {
    if !ALLOWED_BROKER_INSTANCE_TYPES.contains(&instance_type) {
        return Err(ValidationError::new(format!(
            "Invalid instance type. Allowed types: {}",
            ALLOWED_BROKER_INSTANCE_TYPES.join(", ")
        )));
    }
    Ok(())
}

/// Parses the requested worker task count and enforces the hard cap.
pub fn parse_task_count(raw: &str) -> Result<u32, ValidationError> {
    let count: i64 = raw.trim().parse().map_err(|_| {
        ValidationError::new(format!(
            "An integer is required for number of tasks, got {raw} instead."
        ))
    })?;

    if count < 1 {
        return Err(ValidationError::new(
            "Number of tasks must be a positive integer",
        ));
    }
    if count > i64::from(MAX_WORKER_TASKS) {
        return Err(ValidationError::new(format!(
            "Number of tasks cannot exceed {MAX_WORKER_TASKS}"
        )));
    }

    Ok(count as u32)
}
