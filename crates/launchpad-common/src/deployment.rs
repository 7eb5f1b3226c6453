use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The three named resources a managed inference deployment is made of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InferenceResources {
    pub endpoint: String,
    pub endpoint_config: String,
    pub model: String,
}

impl InferenceResources {
    /// Derive resource names from the application name: `{app}`, `{app}-config`, `{app}-model`.
    pub fn for_app(app_name: &str) -> Self {
        Self {
            endpoint: app_name.to_string(),
            endpoint_config: format!("{app_name}-config"),
            model: format!("{app_name}-model"),
        }
    }
}

/// How a deployment treats an existing endpoint with the same name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    /// Fail if the endpoint already exists.
    Create,
    /// Add the new model as an extra variant.
    Add,
    /// Replace whatever serves under the name.
    #[default]
    Replace,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploymentConfig {
    /// Fully-qualified image reference the model container runs.
    pub image_url: String,
    pub execution_role_arn: String,
    pub region_name: String,
    pub mode: DeployMode,
    pub model_name: String,
    pub endpoint_config_name: String,
    pub instance_type: String,
    pub instance_count: u32,

    /// Max seconds to wait for the endpoint to become serving.
    pub timeout_secs: u64,
}

/// A request to stand up one named inference deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploymentRequest {
    /// Endpoint name.
    pub name: String,

    /// Local directory holding the model artifacts.
    pub model_uri: PathBuf,

    pub config: DeploymentConfig,
}
