use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sfn::Client;

use crate::aws::sdk_error;
use crate::error::Result;
use crate::types::WorkflowTrigger;

/// Starts Step Functions state machine executions.
#[derive(Debug, Clone)]
pub struct StepFunctionsTrigger {
    client: Client,
}

impl StepFunctionsTrigger {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl WorkflowTrigger for StepFunctionsTrigger {
    async fn start_execution(&self, workflow_id: &str, input: &serde_json::Value) -> Result<String> {
        let out = self
            .client
            .start_execution()
            .state_machine_arn(workflow_id)
            .input(input.to_string())
            .send()
            .await
            .map_err(|e| sdk_error("stepfunctions", e))?;
        Ok(out.execution_arn().to_string())
    }
}
