use mq_bench_provision_core::contract::{
    CallbackStatus, LifecycleEvent, RequestType, ValidationError,
};
use mq_bench_provision_core::validate::{
    validate_broker_instance_type, validate_broker_username, validate_image_tag,
    validate_repository_url,
};
use serde_json::json;

use crate::adapters::callback::CallbackChannel;
use crate::callback::{send_callback, CallbackResult, InvocationContext};
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "preflight_handler";

/// User-supplied deployment settings checked before any broker or cluster
/// resource is created. Username and instance type are only validated when
/// the deployment wires them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightConfig {
    pub repository_url: String,
    pub repository_tag: String,
    pub broker_username: Option<String>,
    pub broker_instance_type: Option<String>,
}

/// Create/Update validate the configuration; Delete and unknown request
/// types are no-ops so stack teardown never blocks on a bad setting.
pub fn handle_preflight_event(
    event: &LifecycleEvent,
    config: &PreflightConfig,
) -> Result<(), ValidationError> {
    match event.request_type {
        RequestType::Create | RequestType::Update => {
            validate_repository_url(&config.repository_url)?;
            validate_image_tag(&config.repository_tag)?;
            if let Some(username) = &config.broker_username {
                validate_broker_username(username)?;
            }
            if let Some(instance_type) = &config.broker_instance_type {
                validate_broker_instance_type(instance_type)?;
            }
            Ok(())
        }
        RequestType::Delete | RequestType::Other => Ok(()),
    }
}

/// Runs one preflight lifecycle event and sends exactly one callback.
pub fn run_preflight_lifecycle(
    event: &LifecycleEvent,
    ctx: &InvocationContext,
    config: &PreflightConfig,
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

    let result = match handle_preflight_event(event, config) {
        Ok(()) => CallbackResult::success(serde_json::Map::new()),
        Err(error) => {
            log_error(
                COMPONENT,
                "validation_failed",
                json!({
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
