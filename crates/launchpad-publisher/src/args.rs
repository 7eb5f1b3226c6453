use std::path::PathBuf;

use clap::Parser;

use launchpad_common::{AwsArgs, InferenceResources, RegistryArgs, TelemetryArgs};

use crate::pipeline::PublisherConfig;

/// Build, push and deploy the serving image for the staged model version.
#[derive(Debug, Parser)]
#[command(name = "launchpad-publisher")]
pub struct Args {
    #[command(flatten)]
    pub aws: AwsArgs,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub telemetry: TelemetryArgs,

    #[arg(long, env = "AWS_ACCOUNT_ID")]
    pub account_id: String,

    /// Role the inference service assumes to pull the image and model data.
    #[arg(long, env = "LAUNCHPAD_EXECUTION_ROLE_ARN")]
    pub execution_role_arn: String,

    /// Endpoint name; config and model names derive from it.
    #[arg(long, env = "LAUNCHPAD_APP_NAME", default_value = "deployed-model-application")]
    pub app_name: String,

    #[arg(long, env = "LAUNCHPAD_REPOSITORY", default_value = "mlflow-deployment-pyfunc")]
    pub repository: String,

    /// Overrides `{app}-model`.
    #[arg(long)]
    pub model_resource_name: Option<String>,

    /// Overrides `{app}-config`.
    #[arg(long)]
    pub endpoint_config_name: Option<String>,

    /// Bucket holding the tracking server's run artifacts.
    #[arg(long, env = "LAUNCHPAD_ARTIFACT_BUCKET")]
    pub artifact_bucket: String,

    #[arg(long, env = "LAUNCHPAD_ARTIFACT_SUBDIR", default_value = "random-forest-model")]
    pub artifact_subdir: String,

    #[arg(long, env = "LAUNCHPAD_SCRATCH_DIR", default_value = "/tmp")]
    pub scratch_dir: PathBuf,

    /// Image the builder leaves in the local daemon.
    #[arg(long, default_value = "mlflow-pyfunc:latest")]
    pub local_image: String,

    /// Bucket for packaged model data. Defaults to `mlflow-sagemaker-{region}-{account}`.
    #[arg(long, env = "LAUNCHPAD_DEPLOYMENT_BUCKET")]
    pub deployment_bucket: Option<String>,

    #[arg(long, default_value = "ml.m5.large")]
    pub instance_type: String,

    #[arg(long, default_value_t = 1)]
    pub instance_count: u32,

    /// Max seconds to wait for the endpoint to come into service.
    #[arg(long, default_value_t = 1200)]
    pub deploy_timeout_secs: u64,
}

impl Args {
    pub fn publisher_config(&self) -> PublisherConfig {
        let mut resources = InferenceResources::for_app(&self.app_name);
        if let Some(name) = &self.model_resource_name {
            resources.model = name.clone();
        }
        if let Some(name) = &self.endpoint_config_name {
            resources.endpoint_config = name.clone();
        }

        PublisherConfig {
            model_name: self.registry.model_name.clone(),
            stage: self.registry.stage,
            account_id: self.account_id.clone(),
            region: self.aws.region.clone(),
            execution_role_arn: self.execution_role_arn.clone(),
            repository: self.repository.clone(),
            app_name: self.app_name.clone(),
            resources,
            artifact_bucket: self.artifact_bucket.clone(),
            artifact_subdir: self.artifact_subdir.clone(),
            scratch_dir: self.scratch_dir.clone(),
            instance_type: self.instance_type.clone(),
            instance_count: self.instance_count,
            deploy_timeout_secs: self.deploy_timeout_secs,
        }
    }

    pub fn deployment_bucket(&self) -> String {
        self.deployment_bucket.clone().unwrap_or_else(|| {
            format!("mlflow-sagemaker-{}-{}", self.aws.region, self.account_id)
        })
    }
}
