use mq_bench_provision_core::contract::{
    CallbackStatus, LifecycleEvent, ProvisioningHandle, RequestType, ValidationError,
    TASK_HANDLE_PARAMETER_NAME,
};
use mq_bench_provision_core::validate::parse_task_count;
use serde_json::{json, Map, Value};

use crate::adapters::callback::CallbackChannel;
use crate::adapters::handle_store::HandleStore;
use crate::adapters::orchestration::{LaunchSpec, TaskOrchestrator};
use crate::callback::{send_callback, CallbackResult, InvocationContext};
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "provision_handler";

/// Keep-alive placeholder run by every benchmark worker container; the
/// benchmark itself is started over exec once the fleet is up.
pub const PLACEHOLDER_COMMAND: &[&str] =
    &["/bin/sh", "-c", "while true; do echo Running; sleep 60; done;"];

pub const WORKER_ENVIRONMENT: (&str, &str) = ("environment", "production");

/// Deployment-time wiring for the worker fleet, loaded from the function
/// environment by the entrypoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub cluster_name: String,
    pub task_definition: String,
    pub container_name: String,
    pub subnet_ids: Vec<String>,
    /// Raw count; validated per invocation so a bad value fails the
    /// lifecycle run instead of the function init.
    pub default_task_count: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    Validation(ValidationError),
    Orchestration(String),
    Persistence(String),
}

impl std::fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(error) => write!(f, "validation failed: {error}"),
            Self::Orchestration(message) => write!(f, "orchestration call failed: {message}"),
            Self::Persistence(message) => write!(f, "parameter store call failed: {message}"),
        }
    }
}

impl std::error::Error for ProvisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ValidationError> for ProvisionError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error)
    }
}

/// State machine over the lifecycle request type.
///
/// Create and Update launch the fleet and overwrite the persisted handle;
/// Delete stops exactly the persisted tasks; anything else is a no-op
/// success.
pub fn handle_provision_event(
    event: &LifecycleEvent,
    config: &ProvisionConfig,
    orchestrator: &dyn TaskOrchestrator,
    store: &dyn HandleStore,
) -> Result<Map<String, Value>, ProvisionError> {
    match event.request_type {
        RequestType::Create | RequestType::Update => {
            launch_workers(event, config, orchestrator, store)
        }
        RequestType::Delete => stop_workers(config, orchestrator, store),
        RequestType::Other => Ok(Map::new()),
    }
}

fn launch_workers(
    event: &LifecycleEvent,
    config: &ProvisionConfig,
    orchestrator: &dyn TaskOrchestrator,
    store: &dyn HandleStore,
) -> Result<Map<String, Value>, ProvisionError> {
    let raw_count = event
        .property("tasks")
        .unwrap_or(&config.default_task_count);
    let count = parse_task_count(raw_count)?;

    let spec = LaunchSpec {
        cluster: config.cluster_name.clone(),
        task_definition: config.task_definition.clone(),
        count,
        subnet_ids: config.subnet_ids.clone(),
        container_name: config.container_name.clone(),
        command: PLACEHOLDER_COMMAND.iter().map(|part| part.to_string()).collect(),
        environment: vec![(
            WORKER_ENVIRONMENT.0.to_string(),
            WORKER_ENVIRONMENT.1.to_string(),
        )],
    };

    let task_arns = orchestrator
        .launch_tasks(&spec)
        .map_err(ProvisionError::Orchestration)?;

    log_info(
        COMPONENT,
        "workers_launched",
        json!({
            "request_id": event.request_id,
            "requested": count,
            "task_arns": task_arns,
        }),
    );

    let handle = ProvisioningHandle::new(task_arns);
    let stored = serde_json::to_string(&handle).map_err(|error| {
        ProvisionError::Persistence(format!("failed to serialize task handle: {error}"))
    })?;
    store
        .put_parameter(TASK_HANDLE_PARAMETER_NAME, &stored)
        .map_err(ProvisionError::Persistence)?;

    let mut data = Map::new();
    data.insert("TaskArns".to_string(), json!(handle.task_arns));
    Ok(data)
}

fn stop_workers(
    config: &ProvisionConfig,
    orchestrator: &dyn TaskOrchestrator,
    store: &dyn HandleStore,
) -> Result<Map<String, Value>, ProvisionError> {
    let stored = store
        .get_parameter(TASK_HANDLE_PARAMETER_NAME)
        .map_err(ProvisionError::Persistence)?;
    let handle: ProvisioningHandle = serde_json::from_str(&stored).map_err(|error| {
        ProvisionError::Persistence(format!("stored task handle is not a JSON array: {error}"))
    })?;

    // Best-effort: every stored task gets a stop attempt before failures
    // are reported.
    let mut failures = Vec::new();
    for task_arn in &handle.task_arns {
        if let Err(error) = orchestrator.stop_task(&config.cluster_name, task_arn) {
            failures.push(format!("{task_arn}: {error}"));
        }
    }

    if failures.is_empty() {
        Ok(Map::new())
    } else {
        Err(ProvisionError::Orchestration(format!(
            "failed to stop {} of {} tasks: {}",
            failures.len(),
            handle.task_arns.len(),
            failures.join("; ")
        )))
    }
}

/// Runs one lifecycle event end to end: action, then exactly one callback.
///
/// Every handler error is converted into a FAILED callback; a callback
/// delivery failure is logged and swallowed since no retry channel exists.
pub fn run_provision_lifecycle(
    event: &LifecycleEvent,
    ctx: &InvocationContext,
    config: &ProvisionConfig,
    orchestrator: &dyn TaskOrchestrator,
    store: &dyn HandleStore,
    channel: &dyn CallbackChannel,
) -> CallbackStatus {
    log_info(
        COMPONENT,
        "lifecycle_started",
        json!({
            "request_type": event.request_type,
            "request_id": event.request_id,
            "logical_resource_id": event.logical_resource_id,
        }),
    );

    let result = match handle_provision_event(event, config, orchestrator, store) {
        Ok(data) => CallbackResult::success(data),
        Err(error) => {
            log_error(
                COMPONENT,
                "lifecycle_failed",
                json!({
                    "request_type": event.request_type,
                    "request_id": event.request_id,
                    "error": error.to_string(),
                }),
            );
            CallbackResult::failure()
        }
    };

    if let Err(error) = send_callback(channel, event, ctx, &result) {
        log_error(
            COMPONENT,
            "callback_delivery_failed",
            json!({
                "request_id": event.request_id,
                "error": error,
            }),
        );
    }

    result.status
}
