use std::time::Duration;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use mq_bench_provision_core::contract::{CallbackStatus, LifecycleEvent};
use mq_bench_provision_lambda::adapters::callback::CallbackChannel;
use mq_bench_provision_lambda::callback::{send_callback, CallbackResult, InvocationContext};
use mq_bench_provision_lambda::handlers::preflight::{run_preflight_lifecycle, PreflightConfig};
use mq_bench_provision_lambda::logging::log_error;
use serde_json::{json, Value};

const COMPONENT: &str = "preflight_lambda";

struct HttpsCallbackChannel {
    http_client: reqwest::Client,
}

impl CallbackChannel for HttpsCallbackChannel {
    fn put(&self, url: &str, body: &[u8]) -> Result<(), String> {
        let client = self.http_client.clone();
        let url = url.to_string();
        let body = body.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                // The presigned callback URL expects an empty content type.
                let response = client
                    .put(&url)
                    .header("content-type", "")
                    .body(body)
                    .send()
                    .await
                    .map_err(|error| format!("failed to deliver callback: {error}"))?;

                if !response.status().is_success() {
                    return Err(format!(
                        "callback endpoint returned status {}",
                        response.status()
                    ));
                }
                Ok(())
            })
        })
    }
}

fn require_env(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{name} must be configured"))
}

fn load_config() -> Result<PreflightConfig, String> {
    Ok(PreflightConfig {
        repository_url: require_env("CONTAINER_REPO_URL")?,
        repository_tag: require_env("CONTAINER_REPO_TAG")?,
        broker_username: std::env::var("MQ_USERNAME").ok(),
        broker_instance_type: std::env::var("BROKER_INSTANCE_TYPE").ok(),
    })
}

fn invocation_context() -> InvocationContext {
    InvocationContext {
        log_stream_name: std::env::var("AWS_LAMBDA_LOG_STREAM_NAME")
            .unwrap_or_else(|_| "unknown".to_string()),
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let event: LifecycleEvent = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid lifecycle event: {error}")))?;
    let ctx = invocation_context();

    let channel = HttpsCallbackChannel {
        http_client: reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|error| Error::from(format!("failed to build http client: {error}")))?,
    };

    let status = match load_config() {
        Ok(config) => run_preflight_lifecycle(&event, &ctx, &config, &channel),
        Err(message) => {
            log_error(COMPONENT, "configuration_invalid", json!({"error": message}));
            if let Err(error) = send_callback(&channel, &event, &ctx, &CallbackResult::failure()) {
                log_error(COMPONENT, "callback_delivery_failed", json!({"error": error}));
            }
            CallbackStatus::Failed
        }
    };

    Ok(json!({ "Status": status }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
