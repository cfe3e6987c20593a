use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed name of the durable parameter holding the launched task ARNs.
pub const TASK_HANDLE_PARAMETER_NAME: &str = "/ecsTaskExecution/taskArns";

/// Hard cap on the number of benchmark worker tasks per provisioning action.
pub const MAX_WORKER_TASKS: u32 = 10;

/// Lifecycle notification kind emitted by the deployment orchestrator.
///
/// Anything other than the three known kinds is absorbed into `Other`;
/// handlers treat those as no-op successes rather than rejecting the event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
    #[serde(other)]
    Other,
}

/// One custom-resource invocation payload, as CloudFormation sends it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
}

impl LifecycleEvent {
    /// String-valued resource property, if present.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.resource_properties
            .get(name)
            .and_then(|value| value.as_str())
    }
}

/// Durable record of the tasks a Create/Update launched, needed to reverse
/// the action on Delete. Stored as a bare JSON array of ARNs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct ProvisioningHandle {
    pub task_arns: Vec<String>,
}

impl ProvisioningHandle {
    pub fn new(task_arns: Vec<String>) -> Self {
        Self { task_arns }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CallbackStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

/// JSON body of the callback PUT consumed by the deployment orchestrator.
///
/// Correlation fields are copied verbatim from the triggering event; `Reason`
/// points at the invocation's log stream, where error detail is recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackBody {
    pub status: CallbackStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_cloudformation_payload() {
        let event: LifecycleEvent = serde_json::from_value(json!({
            "RequestType": "Create",
            "ResponseURL": "https://cloudformation.example/callback?sig=abc",
            "StackId": "arn:aws:cloudformation:eu-west-1:111122223333:stack/bench/uuid",
            "RequestId": "req-1",
            "LogicalResourceId": "CustomResource",
            "ResourceProperties": {"tasks": "3", "ServiceToken": "arn:aws:lambda:::fn"}
        }))
        .expect("payload should deserialize");

        assert_eq!(event.request_type, RequestType::Create);
        assert_eq!(event.property("tasks"), Some("3"));
        assert_eq!(event.property("missing"), None);
    }

    #[test]
    fn unknown_request_type_maps_to_other() {
        let event: LifecycleEvent = serde_json::from_value(json!({
            "RequestType": "Replace",
            "ResponseURL": "https://cloudformation.example/callback",
            "StackId": "stack",
            "RequestId": "req-2",
            "LogicalResourceId": "CustomResource"
        }))
        .expect("payload should deserialize");

        assert_eq!(event.request_type, RequestType::Other);
        assert!(event.resource_properties.is_empty());
    }

    #[test]
    fn handle_round_trips_as_bare_json_array() {
        let handle = ProvisioningHandle::new(vec!["arn:1".to_string(), "arn:2".to_string()]);
        let stored = serde_json::to_string(&handle).expect("handle should serialize");
        assert_eq!(stored, r#"["arn:1","arn:2"]"#);

        let restored: ProvisioningHandle =
            serde_json::from_str(&stored).expect("stored handle should parse");
        assert_eq!(restored, handle);
    }

    #[test]
    fn callback_body_uses_orchestrator_field_names() {
        let body = CallbackBody {
            status: CallbackStatus::Success,
            reason: "See the details in CloudWatch Log Stream: stream-1".to_string(),
            physical_resource_id: "stream-1".to_string(),
            stack_id: "stack".to_string(),
            request_id: "req-3".to_string(),
            logical_resource_id: "CustomResource".to_string(),
            no_echo: false,
            data: Map::new(),
        };

        let value = serde_json::to_value(&body).expect("body should serialize");
        assert_eq!(value["Status"], json!("SUCCESS"));
        assert_eq!(value["PhysicalResourceId"], json!("stream-1"));
        assert_eq!(value["NoEcho"], json!(false));
        assert_eq!(value["Data"], json!({}));
    }
}
