//! Argument groups shared by the launchpad binaries.
//!
//! Each group is flattened into a binary's `Args`; every flag also reads from
//! the environment so the binaries can run unattended in a workflow step.

use clap::Args;

use crate::model_version::Stage;

#[derive(Debug, Clone, Args)]
pub struct AwsArgs {
    /// AWS region for every service client.
    #[arg(long, env = "AWS_REGION", default_value = "us-west-2")]
    pub region: String,

    /// Named AWS profile. Falls back to the default credential chain when unset.
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RegistryArgs {
    /// Base URL of the MLflow tracking server.
    #[arg(long, env = "MLFLOW_TRACKING_URI", default_value = "http://127.0.0.1:5000")]
    pub tracking_uri: String,

    /// Bearer token for the tracking server, if it requires one.
    #[arg(long, env = "MLFLOW_TRACKING_TOKEN")]
    pub tracking_token: Option<String>,

    /// Registered model to follow.
    #[arg(long, env = "LAUNCHPAD_MODEL_NAME", default_value = "sample_model")]
    pub model_name: String,

    /// Stage that marks a version as approved for serving.
    #[arg(long, env = "LAUNCHPAD_STAGE", default_value_t = Stage::Production)]
    pub stage: Stage,
}

#[derive(Debug, Clone, Args)]
pub struct TelemetryArgs {
    /// OTLP/HTTP base URL for trace export. Disabled when unset.
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Bearer token for the OTLP endpoint.
    #[arg(long, env = "OTLP_TOKEN")]
    pub otlp_token: Option<String>,
}
