/// Parameters of one benchmark worker-fleet launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub cluster: String,
    pub task_definition: String,
    pub count: u32,
    pub subnet_ids: Vec<String>,
    pub container_name: String,
    pub command: Vec<String>,
    pub environment: Vec<(String, String)>,
}

pub trait TaskOrchestrator {
    fn launch_tasks(&self, spec: &LaunchSpec) -> Result<Vec<String>, String>;
    fn stop_task(&self, cluster: &str, task_arn: &str) -> Result<(), String>;
}
