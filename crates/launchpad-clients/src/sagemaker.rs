//! SageMaker deployment: archive the model, upload it, then create model and
//! endpoint config and either create the endpoint or, in replace mode, point
//! the live endpoint at the new config. Waits for the endpoint to serve.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sagemaker::types::{
    ContainerDefinition, EndpointStatus, ProductionVariant, ProductionVariantInstanceType,
};
use aws_sdk_sagemaker::Client;
use tokio::process::Command;

use launchpad_common::{DeployMode, DeploymentRequest};

use crate::aws::sdk_error;
use crate::error::{ClientError, Result};
use crate::types::{DeploymentStatus, InferencePlatform, ObjectStore};

const SERVICE: &str = "sagemaker";

/// Interval between endpoint status checks while waiting for `InService`.
const DEPLOY_POLL_INTERVAL: Duration = Duration::from_secs(15);
const DELETE_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DELETE_TIMEOUT: Duration = Duration::from_secs(300);

const FLAVOR_ENV: (&str, &str) = ("MLFLOW_DEPLOYMENT_FLAVOR_NAME", "python_function");
const SERVING_ENV: (&str, &str) = ("SERVING_ENVIRONMENT", "SageMaker");

pub struct SageMakerPlatform {
    client: Client,
    store: Arc<dyn ObjectStore>,
    /// Bucket receiving `model.tar.gz` archives.
    deployment_bucket: String,
}

impl SageMakerPlatform {
    pub fn new(config: &SdkConfig, store: Arc<dyn ObjectStore>, deployment_bucket: String) -> Self {
        Self {
            client: Client::new(config),
            store,
            deployment_bucket,
        }
    }

    async fn endpoint_status(&self, name: &str) -> Result<(EndpointStatus, Option<String>, Option<String>)> {
        let out = self
            .client
            .describe_endpoint()
            .endpoint_name(name)
            .send()
            .await
            .map_err(|e| sdk_error(SERVICE, e))?;
        let status = out
            .endpoint_status()
            .cloned()
            .ok_or_else(|| ClientError::Decode(format!("endpoint {name} has no status")))?;
        Ok((
            status,
            out.failure_reason().map(str::to_string),
            out.endpoint_arn().map(str::to_string),
        ))
    }

    async fn wait_until_deleted(&self, name: &str) -> Result<()> {
        let started = Instant::now();
        loop {
            match self.endpoint_status(name).await {
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(e),
                Ok((status, _, _)) => {
                    tracing::debug!(endpoint=%name, status=%status.as_str(), "waiting for endpoint deletion");
                }
            }
            if started.elapsed() >= DELETE_TIMEOUT {
                return Err(ClientError::Timeout(format!(
                    "endpoint {name} still present after {}s",
                    DELETE_TIMEOUT.as_secs()
                )));
            }
            tokio::time::sleep(DELETE_POLL_INTERVAL).await;
        }
    }

    async fn wait_until_in_service(&self, name: &str, timeout: Duration) -> Result<DeploymentStatus> {
        let started = Instant::now();
        loop {
            let (status, reason, arn) = self.endpoint_status(name).await?;
            match status {
                EndpointStatus::InService => {
                    return Ok(DeploymentStatus {
                        endpoint_name: name.to_string(),
                        endpoint_arn: arn,
                        status: status.as_str().to_string(),
                    });
                }
                EndpointStatus::Failed => {
                    return Err(ClientError::Rejected {
                        service: SERVICE,
                        code: "EndpointFailed".to_string(),
                        message: reason.unwrap_or_else(|| "no failure reason reported".to_string()),
                    });
                }
                other => {
                    tracing::info!(endpoint=%name, status=%other.as_str(), elapsed_s = started.elapsed().as_secs(), "waiting for endpoint");
                }
            }
            if started.elapsed() >= timeout {
                return Err(ClientError::Timeout(format!(
                    "endpoint {name} not in service after {}s",
                    timeout.as_secs()
                )));
            }
            tokio::time::sleep(DEPLOY_POLL_INTERVAL).await;
        }
    }
}

/// What to do with the endpoint once model and config exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndpointAction {
    Create,
    Update,
}

fn endpoint_action(mode: DeployMode, existing: bool, name: &str) -> Result<EndpointAction> {
    match (mode, existing) {
        (DeployMode::Add, _) => Err(ClientError::InvalidRequest(
            "add mode is not supported; use create or replace".to_string(),
        )),
        (_, false) => Ok(EndpointAction::Create),
        (DeployMode::Replace, true) => Ok(EndpointAction::Update),
        (DeployMode::Create, true) => Err(ClientError::InvalidRequest(format!(
            "endpoint {name} already exists; use replace mode"
        ))),
    }
}

/// Object key of the uploaded model archive.
fn model_data_key(model_name: &str) -> String {
    format!("{model_name}/model.tar.gz")
}

/// Location of the local archive, next to the model directory.
fn archive_path(model_dir: &Path) -> PathBuf {
    model_dir
        .parent()
        .unwrap_or(model_dir)
        .join("model.tar.gz")
}

/// Pack the model directory contents (not the directory itself) into a gzip tarball.
async fn archive_model(model_dir: &Path, dest: &Path) -> Result<()> {
    let output = Command::new("tar")
        .arg("-czf")
        .arg(dest)
        .arg("-C")
        .arg(model_dir)
        .arg(".")
        .output()
        .await?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ClientError::InvalidRequest(format!(
            "tar failed for {}: {}",
            model_dir.display(),
            stderr.trim()
        )))
    }
}

#[async_trait]
impl InferencePlatform for SageMakerPlatform {
    async fn delete_endpoint(&self, name: &str) -> Result<()> {
        self.client
            .delete_endpoint()
            .endpoint_name(name)
            .send()
            .await
            .map_err(|e| sdk_error(SERVICE, e))?;
        // Deletion is asynchronous; a create under the same name fails until it finishes.
        self.wait_until_deleted(name).await
    }

    async fn delete_endpoint_config(&self, name: &str) -> Result<()> {
        self.client
            .delete_endpoint_config()
            .endpoint_config_name(name)
            .send()
            .await
            .map_err(|e| sdk_error(SERVICE, e))?;
        Ok(())
    }

    async fn delete_model(&self, name: &str) -> Result<()> {
        self.client
            .delete_model()
            .model_name(name)
            .send()
            .await
            .map_err(|e| sdk_error(SERVICE, e))?;
        Ok(())
    }

    async fn create_deployment(&self, request: &DeploymentRequest) -> Result<DeploymentStatus> {
        let cfg = &request.config;
        if !request.model_uri.is_dir() {
            return Err(ClientError::InvalidRequest(format!(
                "model directory does not exist: {}",
                request.model_uri.display()
            )));
        }

        let existing = match self.endpoint_status(&request.name).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => return Err(e),
        };
        let action = endpoint_action(cfg.mode, existing, &request.name)?;

        let archive = archive_path(&request.model_uri);
        archive_model(&request.model_uri, &archive).await?;

        self.store.ensure_bucket(&self.deployment_bucket).await?;
        let key = model_data_key(&cfg.model_name);
        self.store.upload(&self.deployment_bucket, &key, &archive).await?;
        let model_data_url = format!("s3://{}/{}", self.deployment_bucket, key);
        tracing::info!(%model_data_url, "uploaded model archive");

        let container = ContainerDefinition::builder()
            .image(&cfg.image_url)
            .model_data_url(&model_data_url)
            .environment(FLAVOR_ENV.0, FLAVOR_ENV.1)
            .environment(SERVING_ENV.0, SERVING_ENV.1)
            .build();
        self.client
            .create_model()
            .model_name(&cfg.model_name)
            .primary_container(container)
            .execution_role_arn(&cfg.execution_role_arn)
            .send()
            .await
            .map_err(|e| sdk_error(SERVICE, e))?;
        tracing::info!(model=%cfg.model_name, "created model");

        let instance_count = i32::try_from(cfg.instance_count)
            .map_err(|_| ClientError::InvalidRequest(format!("instance count {} out of range", cfg.instance_count)))?;
        let variant = ProductionVariant::builder()
            .variant_name(&cfg.model_name)
            .model_name(&cfg.model_name)
            .initial_instance_count(instance_count)
            .instance_type(ProductionVariantInstanceType::from(cfg.instance_type.as_str()))
            .initial_variant_weight(1.0)
            .build();
        self.client
            .create_endpoint_config()
            .endpoint_config_name(&cfg.endpoint_config_name)
            .production_variants(variant)
            .send()
            .await
            .map_err(|e| sdk_error(SERVICE, e))?;
        tracing::info!(config=%cfg.endpoint_config_name, "created endpoint config");

        match action {
            EndpointAction::Create => {
                self.client
                    .create_endpoint()
                    .endpoint_name(&request.name)
                    .endpoint_config_name(&cfg.endpoint_config_name)
                    .send()
                    .await
                    .map_err(|e| sdk_error(SERVICE, e))?;
                tracing::info!(endpoint=%request.name, "created endpoint");
            }
            EndpointAction::Update => {
                self.client
                    .update_endpoint()
                    .endpoint_name(&request.name)
                    .endpoint_config_name(&cfg.endpoint_config_name)
                    .send()
                    .await
                    .map_err(|e| sdk_error(SERVICE, e))?;
                tracing::info!(endpoint=%request.name, "updating existing endpoint");
            }
        }

        self.wait_until_in_service(&request.name, Duration::from_secs(cfg.timeout_secs))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_data_key() {
        assert_eq!(
            model_data_key("deployed-model-application-model"),
            "deployed-model-application-model/model.tar.gz"
        );
    }

    #[test]
    fn test_endpoint_action() {
        assert_eq!(
            endpoint_action(DeployMode::Replace, false, "app").unwrap(),
            EndpointAction::Create
        );
        assert_eq!(
            endpoint_action(DeployMode::Replace, true, "app").unwrap(),
            EndpointAction::Update
        );
        assert_eq!(
            endpoint_action(DeployMode::Create, false, "app").unwrap(),
            EndpointAction::Create
        );
        assert!(endpoint_action(DeployMode::Create, true, "app").is_err());
        assert!(endpoint_action(DeployMode::Add, false, "app").is_err());
    }

    #[test]
    fn test_archive_path_is_sibling() {
        assert_eq!(
            archive_path(Path::new("/tmp/e1/r1/artifacts/random-forest-model")),
            PathBuf::from("/tmp/e1/r1/artifacts/model.tar.gz")
        );
    }

    #[tokio::test]
    async fn test_archive_model() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("model");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("MLmodel"), "flavors: {}\n").unwrap();

        let dest = archive_path(&model_dir);
        archive_model(&model_dir, &dest).await.unwrap();
        assert!(dest.is_file());
        assert!(std::fs::metadata(&dest).unwrap().len() > 0);
    }
}
