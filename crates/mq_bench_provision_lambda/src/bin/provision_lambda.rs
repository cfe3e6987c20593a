use std::time::Duration;

use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use aws_sdk_ssm::types::ParameterType;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use mq_bench_provision_core::contract::{CallbackStatus, LifecycleEvent};
use mq_bench_provision_lambda::adapters::callback::CallbackChannel;
use mq_bench_provision_lambda::adapters::handle_store::HandleStore;
use mq_bench_provision_lambda::adapters::orchestration::{LaunchSpec, TaskOrchestrator};
use mq_bench_provision_lambda::callback::{send_callback, CallbackResult, InvocationContext};
use mq_bench_provision_lambda::handlers::provision::{run_provision_lifecycle, ProvisionConfig};
use mq_bench_provision_lambda::logging::log_error;
use serde_json::{json, Value};

const COMPONENT: &str = "provision_lambda";

struct EcsTaskOrchestrator {
    ecs_client: aws_sdk_ecs::Client,
}

impl TaskOrchestrator for EcsTaskOrchestrator {
    fn launch_tasks(&self, spec: &LaunchSpec) -> Result<Vec<String>, String> {
        let client = self.ecs_client.clone();
        let spec = spec.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let network = AwsVpcConfiguration::builder()
                    .set_subnets(Some(spec.subnet_ids.clone()))
                    .assign_public_ip(AssignPublicIp::Enabled)
                    .build()
                    .map_err(|error| format!("invalid awsvpc configuration: {error}"))?;

                let mut container = ContainerOverride::builder()
                    .name(&spec.container_name)
                    .set_command(Some(spec.command.clone()));
                for (name, value) in &spec.environment {
                    container = container
                        .environment(KeyValuePair::builder().name(name).value(value).build());
                }

                let response = client
                    .run_task()
                    .cluster(&spec.cluster)
                    .task_definition(&spec.task_definition)
                    .count(spec.count as i32)
                    .launch_type(LaunchType::Fargate)
                    .network_configuration(
                        NetworkConfiguration::builder()
                            .awsvpc_configuration(network)
                            .build(),
                    )
                    .overrides(
                        TaskOverride::builder()
                            .container_overrides(container.build())
                            .build(),
                    )
                    .enable_execute_command(true)
                    .send()
                    .await
                    .map_err(|error| format!("failed to run ecs tasks: {error}"))?;

                Ok(response
                    .tasks()
                    .iter()
                    .filter_map(|task| task.task_arn().map(str::to_string))
                    .collect())
            })
        })
    }

    fn stop_task(&self, cluster: &str, task_arn: &str) -> Result<(), String> {
        let client = self.ecs_client.clone();
        let cluster = cluster.to_string();
        let task_arn = task_arn.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .stop_task()
                    .cluster(cluster)
                    .task(task_arn)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to stop ecs task: {error}"))
            })
        })
    }
}

struct SsmHandleStore {
    ssm_client: aws_sdk_ssm::Client,
}

impl HandleStore for SsmHandleStore {
    fn put_parameter(&self, name: &str, value: &str) -> Result<(), String> {
        let client = self.ssm_client.clone();
        let name = name.to_string();
        let value = value.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_parameter()
                    .name(name)
                    .value(value)
                    .r#type(ParameterType::String)
                    .overwrite(true)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write task handle parameter: {error}"))
            })
        })
    }

    fn get_parameter(&self, name: &str) -> Result<String, String> {
        let client = self.ssm_client.clone();
        let name = name.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .get_parameter()
                    .name(name)
                    .send()
                    .await
                    .map_err(|error| format!("failed to read task handle parameter: {error}"))?;

                response
                    .parameter()
                    .and_then(|parameter| parameter.value())
                    .map(str::to_string)
                    .ok_or_else(|| "task handle parameter has no value".to_string())
            })
        })
    }
}

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

fn load_config() -> Result<ProvisionConfig, String> {
    Ok(ProvisionConfig {
        cluster_name: require_env("CLUSTER_NAME")?,
        task_definition: require_env("TASK_DEFINITION")?,
        container_name: require_env("CONTAINER_NAME")?,
        subnet_ids: require_env("SUBNETS")?
            .split(',')
            .map(|subnet| subnet.trim().to_string())
            .filter(|subnet| !subnet.is_empty())
            .collect(),
        default_task_count: require_env("NUMBER_OF_TASKS")?,
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

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let orchestrator = EcsTaskOrchestrator {
        ecs_client: aws_sdk_ecs::Client::new(&aws_config),
    };
    let store = SsmHandleStore {
        ssm_client: aws_sdk_ssm::Client::new(&aws_config),
    };
    let channel = HttpsCallbackChannel {
        http_client: reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|error| Error::from(format!("failed to build http client: {error}")))?,
    };

    let status = match load_config() {
        Ok(config) => {
            run_provision_lifecycle(&event, &ctx, &config, &orchestrator, &store, &channel)
        }
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
