use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use launchpad_common::{DeploymentRequest, ModelVersion, RunInfo, Stage};

use crate::error::Result;

/// Model registry: resolves staged versions and the runs that produced them.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Latest version per requested stage. Empty when nothing carries the stage.
    async fn latest_versions(&self, model_name: &str, stage: Stage) -> Result<Vec<ModelVersion>>;

    async fn get_run(&self, run_id: &str) -> Result<RunInfo>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every key under `prefix`, across all listing pages.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Copy one object to `dest`. The parent directory must exist.
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<()>;

    async fn upload(&self, bucket: &str, key: &str, src: &Path) -> Result<()>;

    /// Create the bucket unless it already exists.
    async fn ensure_bucket(&self, bucket: &str) -> Result<()>;
}

/// An image found in a remote repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageDetail {
    pub repository: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[async_trait]
pub trait ImageRegistry: Send + Sync {
    async fn repository_exists(&self, repository: &str) -> Result<bool>;

    async fn create_repository(&self, repository: &str) -> Result<()>;

    /// Look up a tag in a repository; `None` when the tag is not listed.
    async fn find_image(&self, repository: &str, tag: &str) -> Result<Option<ImageDetail>>;
}

/// Outcome of a successful deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentStatus {
    pub endpoint_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_arn: Option<String>,
    pub status: String,
}

/// Managed inference control plane.
#[async_trait]
pub trait InferencePlatform: Send + Sync {
    async fn delete_endpoint(&self, name: &str) -> Result<()>;

    async fn delete_endpoint_config(&self, name: &str) -> Result<()>;

    async fn delete_model(&self, name: &str) -> Result<()>;

    async fn create_deployment(&self, request: &DeploymentRequest) -> Result<DeploymentStatus>;
}

#[async_trait]
pub trait WorkflowTrigger: Send + Sync {
    /// Start one workflow execution and return its identifier.
    async fn start_execution(&self, workflow_id: &str, input: &serde_json::Value) -> Result<String>;
}
