//! Builds and delivers the completion notification the deployment
//! orchestrator blocks on.

use mq_bench_provision_core::contract::{CallbackBody, CallbackStatus, LifecycleEvent};
use serde_json::{Map, Value};

use crate::adapters::callback::CallbackChannel;

/// Log context of the current invocation; the callback reason points here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub log_stream_name: String,
}

/// Outcome of one lifecycle run, before it is put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackResult {
    pub status: CallbackStatus,
    pub physical_resource_id: Option<String>,
    pub data: Map<String, Value>,
}

impl CallbackResult {
    pub fn success(data: Map<String, Value>) -> Self {
        Self {
            status: CallbackStatus::Success,
            physical_resource_id: None,
            data,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: CallbackStatus::Failed,
            physical_resource_id: None,
            data: Map::new(),
        }
    }
}

/// Sends the one callback PUT the orchestrator is waiting on.
///
/// An unreported outcome stalls the deployment indefinitely, so callers must
/// reach this exactly once per lifecycle event, on success and failure alike.
/// Error detail never travels in the body; `Reason` points at the log stream.
pub fn send_callback(
    channel: &dyn CallbackChannel,
    event: &LifecycleEvent,
    ctx: &InvocationContext,
    result: &CallbackResult,
) -> Result<(), String> {
    let body = CallbackBody {
        status: result.status,
        reason: format!(
            "See the details in CloudWatch Log Stream: {}",
            ctx.log_stream_name
        ),
        physical_resource_id: result
            .physical_resource_id
            .clone()
            .unwrap_or_else(|| ctx.log_stream_name.clone()),
        stack_id: event.stack_id.clone(),
        request_id: event.request_id.clone(),
        logical_resource_id: event.logical_resource_id.clone(),
        no_echo: false,
        data: result.data.clone(),
    };

    let payload = serde_json::to_vec(&body)
        .map_err(|error| format!("failed to serialize callback body: {error}"))?;
    channel.put(&event.response_url, &payload)
}
