//! Deployment publisher
//!
//! One run resolves the staged model version, downloads its artifacts, builds
//! and pushes a uniquely tagged serving image, tears down the previous
//! inference resources and creates the new deployment. Every fatal failure
//! surfaces as a [`PublishError`]; preconditions are checked before anything
//! is built or pushed.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use launchpad_clients::types::DeploymentStatus;
use launchpad_clients::{ClientError, ImageRegistry, InferencePlatform, ModelRegistry, ObjectStore};
use launchpad_common::{
    unique_tag, ArtifactLocation, Clock, DeployMode, DeploymentConfig, DeploymentRequest,
    ImageRef, InferenceResources, ModelVersion, Stage,
};

use crate::download::download_artifacts;
use crate::toolchain::{ContainerToolchain, ToolchainError};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no model version of '{model}' found with stage '{stage}'")]
    NoStagedVersion { model: String, stage: Stage },

    #[error("container toolchain is not available: {0}")]
    ToolchainUnavailable(#[source] ToolchainError),

    #[error("artifact path does not exist: {}", .0.display())]
    ArtifactPathMissing(PathBuf),

    #[error("object key escapes the artifact directory: {0}")]
    UnsafeObjectKey(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error("pushed image {image} is not listed in the registry")]
    ImageNotPushed { image: String },

    #[error("failed to {step}: {source}")]
    Client {
        step: &'static str,
        #[source]
        source: ClientError,
    },
}

impl PublishError {
    pub(crate) fn client(step: &'static str, source: ClientError) -> Self {
        Self::Client { step, source }
    }
}

/// Everything a publisher run needs to know, resolved up front.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub model_name: String,
    pub stage: Stage,
    pub account_id: String,
    pub region: String,
    pub execution_role_arn: String,
    pub repository: String,
    pub app_name: String,
    pub resources: InferenceResources,
    pub artifact_bucket: String,
    /// Artifact directory name inside the run, e.g. "random-forest-model".
    pub artifact_subdir: String,
    pub scratch_dir: PathBuf,
    pub instance_type: String,
    pub instance_count: u32,
    pub deploy_timeout_secs: u64,
}

impl PublisherConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let required = [
            ("model_name", &self.model_name),
            ("account_id", &self.account_id),
            ("region", &self.region),
            ("execution_role_arn", &self.execution_role_arn),
            ("repository", &self.repository),
            ("app_name", &self.app_name),
            ("artifact_bucket", &self.artifact_bucket),
            ("artifact_subdir", &self.artifact_subdir),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("{name} cannot be empty");
            }
        }
        if !self.account_id.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("account_id must be numeric, got '{}'", self.account_id);
        }
        if self.instance_count == 0 {
            anyhow::bail!("instance_count must be greater than 0");
        }
        Ok(())
    }
}

/// External collaborators of a publisher run.
pub struct Collaborators {
    pub registry: Arc<dyn ModelRegistry>,
    pub store: Arc<dyn ObjectStore>,
    pub images: Arc<dyn ImageRegistry>,
    pub platform: Arc<dyn InferencePlatform>,
    pub toolchain: Arc<dyn ContainerToolchain>,
}

/// What happened to one inference resource during teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum TeardownOutcome {
    Deleted,
    Absent(String),
    Refused(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TeardownReport {
    pub endpoint: TeardownOutcome,
    pub endpoint_config: TeardownOutcome,
    pub model: TeardownOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub model_version: String,
    pub run_id: String,
    pub image: String,
    pub artifacts: Vec<PathBuf>,
    pub resources: InferenceResources,
    pub teardown: TeardownReport,
    pub deployment: DeploymentStatus,
}

pub struct Publisher {
    config: PublisherConfig,
    deps: Collaborators,
    clock: Arc<dyn Clock>,
}

impl Publisher {
    pub fn new(config: PublisherConfig, deps: Collaborators, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            deps,
            clock,
        }
    }

    pub async fn run(&self) -> Result<PublishReport, PublishError> {
        self.ensure_repository().await?;

        let version = self.resolve_version().await?;
        let run = self
            .deps
            .registry
            .get_run(&version.run_id)
            .await
            .map_err(|e| PublishError::client("fetch run", e))?;

        let location = ArtifactLocation::new(
            &run.experiment_id,
            &version.run_id,
            &self.config.artifact_subdir,
            &self.config.scratch_dir,
        );
        info!(prefix=%location.prefix, local=%location.local_dir.display(), "downloading artifacts");
        let artifacts =
            download_artifacts(self.deps.store.as_ref(), &self.config.artifact_bucket, &location)
                .await?;

        self.preflight(&location).await?;

        let local_image = self.deps.toolchain.build(&location.local_dir).await?;
        info!(%local_image, "built serving image");

        let tag = unique_tag(self.clock.now());
        let image = ImageRef::ecr(
            &self.config.account_id,
            &self.config.region,
            &self.config.repository,
            &tag,
        );
        info!(%tag, "unique tag");
        let image_url = image.to_string();

        self.deps.toolchain.tag(&local_image, &image_url).await?;
        self.deps.toolchain.push(&image_url).await?;
        info!(image=%image_url, "pushed image");

        self.verify_push(&image).await?;

        let teardown = self.teardown().await?;

        info!(image=%image_url, "deploying image");
        let request = self.deployment_request(&location, &image_url);
        let deployment = self
            .deps
            .platform
            .create_deployment(&request)
            .await
            .map_err(|e| PublishError::client("create deployment", e))?;
        info!(
            endpoint=%deployment.endpoint_name,
            run_id=%version.run_id,
            "model deployed successfully"
        );

        Ok(PublishReport {
            model_version: version.version,
            run_id: version.run_id,
            image: image_url,
            artifacts,
            resources: self.config.resources.clone(),
            teardown,
            deployment,
        })
    }

    async fn ensure_repository(&self) -> Result<(), PublishError> {
        let repo = &self.config.repository;
        let exists = self
            .deps
            .images
            .repository_exists(repo)
            .await
            .map_err(|e| PublishError::client("describe repository", e))?;
        if exists {
            info!(repository=%repo, "repository already exists");
        } else {
            self.deps
                .images
                .create_repository(repo)
                .await
                .map_err(|e| PublishError::client("create repository", e))?;
            info!(repository=%repo, "created repository");
        }
        Ok(())
    }

    async fn resolve_version(&self) -> Result<ModelVersion, PublishError> {
        let versions = self
            .deps
            .registry
            .latest_versions(&self.config.model_name, self.config.stage)
            .await
            .map_err(|e| PublishError::client("query model versions", e))?;

        let version = ModelVersion::newest(versions).ok_or_else(|| PublishError::NoStagedVersion {
            model: self.config.model_name.clone(),
            stage: self.config.stage,
        })?;
        info!(
            model=%version.name,
            version=%version.version,
            run_id=%version.run_id,
            "resolved model version"
        );
        Ok(version)
    }

    /// Checks that must pass before anything is built or pushed.
    async fn preflight(&self, location: &ArtifactLocation) -> Result<(), PublishError> {
        self.deps
            .toolchain
            .health_check()
            .await
            .map_err(PublishError::ToolchainUnavailable)?;

        if !location.local_dir.is_dir() {
            return Err(PublishError::ArtifactPathMissing(location.local_dir.clone()));
        }
        Ok(())
    }

    async fn verify_push(&self, image: &ImageRef) -> Result<(), PublishError> {
        let found = self
            .deps
            .images
            .find_image(&image.repository, &image.tag)
            .await
            .map_err(|e| PublishError::client("describe images", e))?;
        match found {
            Some(detail) => {
                info!(
                    repository=%detail.repository,
                    tags=?detail.tags,
                    digest=?detail.digest,
                    "image present in registry"
                );
                Ok(())
            }
            None => Err(PublishError::ImageNotPushed {
                image: image.to_string(),
            }),
        }
    }

    /// Delete endpoint, endpoint config and model, each independently.
    ///
    /// A resource the service reports missing or refuses to delete is logged
    /// and skipped; only failures to reach the service abort the run.
    async fn teardown(&self) -> Result<TeardownReport, PublishError> {
        let names = &self.config.resources;
        let platform = &self.deps.platform;

        let endpoint = outcome("endpoint", &names.endpoint, platform.delete_endpoint(&names.endpoint).await)?;
        let endpoint_config = outcome(
            "endpoint config",
            &names.endpoint_config,
            platform.delete_endpoint_config(&names.endpoint_config).await,
        )?;
        let model = outcome("model", &names.model, platform.delete_model(&names.model).await)?;

        Ok(TeardownReport {
            endpoint,
            endpoint_config,
            model,
        })
    }

    fn deployment_request(&self, location: &ArtifactLocation, image_url: &str) -> DeploymentRequest {
        DeploymentRequest {
            name: self.config.resources.endpoint.clone(),
            model_uri: location.local_dir.clone(),
            config: DeploymentConfig {
                image_url: image_url.to_string(),
                execution_role_arn: self.config.execution_role_arn.clone(),
                region_name: self.config.region.clone(),
                mode: DeployMode::Replace,
                model_name: self.config.resources.model.clone(),
                endpoint_config_name: self.config.resources.endpoint_config.clone(),
                instance_type: self.config.instance_type.clone(),
                instance_count: self.config.instance_count,
                timeout_secs: self.config.deploy_timeout_secs,
            },
        }
    }
}

fn outcome(
    kind: &'static str,
    name: &str,
    result: Result<(), ClientError>,
) -> Result<TeardownOutcome, PublishError> {
    match result {
        Ok(()) => {
            info!(kind, name=%name, "deleted");
            Ok(TeardownOutcome::Deleted)
        }
        Err(e) if e.is_not_found() => {
            warn!(kind, name=%name, error=%e, "nothing to delete");
            Ok(TeardownOutcome::Absent(e.to_string()))
        }
        Err(e) if e.is_service_side() => {
            warn!(kind, name=%name, error=%e, "delete refused, continuing");
            Ok(TeardownOutcome::Refused(e.to_string()))
        }
        Err(e) => Err(PublishError::client("tear down inference resources", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use launchpad_clients::memory::{
        MemoryImageRegistry, MemoryInferencePlatform, MemoryModelRegistry, MemoryObjectStore,
        PlatformCall, ResourceKind,
    };
    use launchpad_common::RunInfo;

    const LOCAL_IMAGE: &str = "mlflow-pyfunc:latest";

    /// Clock that advances a fixed step on every read.
    struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: chrono::Duration,
    }

    impl SteppingClock {
        fn new(start: DateTime<Utc>, step_secs: i64) -> Self {
            Self {
                next: Mutex::new(start),
                step: chrono::Duration::seconds(step_secs),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self.next.lock().unwrap();
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// Records every toolchain call; pushes land in the shared image registry.
    struct FakeToolchain {
        healthy: bool,
        drop_pushes: bool,
        images: Arc<MemoryImageRegistry>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeToolchain {
        fn new(images: Arc<MemoryImageRegistry>) -> Self {
            Self {
                healthy: true,
                drop_pushes: false,
                images,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContainerToolchain for FakeToolchain {
        async fn health_check(&self) -> Result<(), ToolchainError> {
            self.calls.lock().unwrap().push("health".to_string());
            if self.healthy {
                Ok(())
            } else {
                Err(ToolchainError::Failed {
                    command: "docker info".to_string(),
                    code: 1,
                    stderr: "Cannot connect to the Docker daemon".to_string(),
                })
            }
        }

        async fn build(&self, model_dir: &Path) -> Result<String, ToolchainError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("build {}", model_dir.display()));
            Ok(LOCAL_IMAGE.to_string())
        }

        async fn tag(&self, source: &str, target: &str) -> Result<(), ToolchainError> {
            self.calls.lock().unwrap().push(format!("tag {source} {target}"));
            Ok(())
        }

        async fn push(&self, image: &str) -> Result<(), ToolchainError> {
            self.calls.lock().unwrap().push(format!("push {image}"));
            if !self.drop_pushes {
                let (path, tag) = image.rsplit_once(':').unwrap();
                let repository = path.split_once('/').unwrap().1;
                self.images.record_push(repository, tag);
            }
            Ok(())
        }
    }

    struct Harness {
        registry: Arc<MemoryModelRegistry>,
        store: Arc<MemoryObjectStore>,
        images: Arc<MemoryImageRegistry>,
        platform: Arc<MemoryInferencePlatform>,
        toolchain: Arc<FakeToolchain>,
        scratch: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let images = Arc::new(MemoryImageRegistry::new());
            Self {
                registry: Arc::new(MemoryModelRegistry::new()),
                store: Arc::new(MemoryObjectStore::new()),
                toolchain: Arc::new(FakeToolchain::new(images.clone())),
                images,
                platform: Arc::new(MemoryInferencePlatform::new()),
                scratch: tempfile::tempdir().unwrap(),
            }
        }

        /// Registry with version 3 of run r1 in experiment e1, and its two artifacts.
        fn with_production_model(self) -> Self {
            self.registry.add_version(ModelVersion {
                name: "sample_model".to_string(),
                version: "3".to_string(),
                current_stage: Stage::Production,
                creation_timestamp: 1000,
                run_id: "r1".to_string(),
                source: None,
                status: None,
            });
            self.registry.add_run(RunInfo {
                run_id: "r1".to_string(),
                experiment_id: "e1".to_string(),
                artifact_uri: None,
            });
            self.store.put(
                "artifacts",
                "e1/r1/artifacts/random-forest-model/MLmodel",
                "flavors:\n  python_function: {}\n",
            );
            self.store.put(
                "artifacts",
                "e1/r1/artifacts/random-forest-model/model.pkl",
                vec![0x80, 0x04, 0x95],
            );
            self
        }

        fn config(&self) -> PublisherConfig {
            PublisherConfig {
                model_name: "sample_model".to_string(),
                stage: Stage::Production,
                account_id: "851725217119".to_string(),
                region: "us-west-2".to_string(),
                execution_role_arn: "arn:aws:iam::851725217119:role/ml_deployment".to_string(),
                repository: "mlflow-deployment-pyfunc".to_string(),
                app_name: "deployed-model-application".to_string(),
                resources: InferenceResources::for_app("deployed-model-application"),
                artifact_bucket: "artifacts".to_string(),
                artifact_subdir: "random-forest-model".to_string(),
                scratch_dir: self.scratch.path().to_path_buf(),
                instance_type: "ml.m5.large".to_string(),
                instance_count: 1,
                deploy_timeout_secs: 1200,
            }
        }

        fn publisher(&self, clock: Arc<dyn Clock>) -> Publisher {
            Publisher::new(
                self.config(),
                Collaborators {
                    registry: self.registry.clone(),
                    store: self.store.clone(),
                    images: self.images.clone(),
                    platform: self.platform.clone(),
                    toolchain: self.toolchain.clone(),
                },
                clock,
            )
        }

        fn local_dir(&self) -> PathBuf {
            self.scratch.path().join("e1/r1/artifacts/random-forest-model")
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(SteppingClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            1,
        ))
    }

    #[tokio::test]
    async fn test_end_to_end_publish() {
        let h = Harness::new().with_production_model();
        let report = h.publisher(clock()).run().await.unwrap();

        // Artifacts mirrored under the scratch dir.
        let local = h.local_dir();
        assert_eq!(
            std::fs::read_to_string(local.join("MLmodel")).unwrap(),
            "flavors:\n  python_function: {}\n"
        );
        assert_eq!(std::fs::read(local.join("model.pkl")).unwrap(), vec![0x80, 0x04, 0x95]);
        assert_eq!(report.artifacts.len(), 2);

        let image = "851725217119.dkr.ecr.us-west-2.amazonaws.com/mlflow-deployment-pyfunc:20240501120000";
        assert_eq!(report.image, image);
        assert_eq!(report.model_version, "3");
        assert_eq!(report.run_id, "r1");
        assert_eq!(
            h.toolchain.calls(),
            vec![
                "health".to_string(),
                format!("build {}", local.display()),
                format!("tag {LOCAL_IMAGE} {image}"),
                format!("push {image}"),
            ]
        );

        let deployments = h.platform.deployments();
        assert_eq!(deployments.len(), 1);
        let d = &deployments[0];
        assert_eq!(d.name, "deployed-model-application");
        assert_eq!(d.model_uri, local);
        assert_eq!(d.config.image_url, image);
        assert_eq!(d.config.mode, DeployMode::Replace);
        assert_eq!(d.config.model_name, "deployed-model-application-model");
        assert_eq!(d.config.endpoint_config_name, "deployed-model-application-config");
        assert_eq!(d.config.execution_role_arn, "arn:aws:iam::851725217119:role/ml_deployment");
        assert_eq!(d.config.region_name, "us-west-2");

        // Repository did not exist, so it was created once.
        assert_eq!(h.images.created_count(), 1);
    }

    #[tokio::test]
    async fn test_no_staged_version_aborts_before_build() {
        let h = Harness::new();
        let err = h.publisher(clock()).run().await.unwrap_err();

        assert!(matches!(err, PublishError::NoStagedVersion { .. }));
        assert!(h.toolchain.calls().is_empty());
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unhealthy_toolchain_aborts_before_build() {
        let mut h = Harness::new().with_production_model();
        let images = h.images.clone();
        h.toolchain = Arc::new(FakeToolchain {
            healthy: false,
            ..FakeToolchain::new(images)
        });

        let err = h.publisher(clock()).run().await.unwrap_err();
        assert!(matches!(err, PublishError::ToolchainUnavailable(_)));
        assert_eq!(h.toolchain.calls(), vec!["health".to_string()]);
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_artifacts_abort_before_build() {
        let h = Harness::new();
        h.registry.add_version(ModelVersion {
            name: "sample_model".to_string(),
            version: "1".to_string(),
            current_stage: Stage::Production,
            creation_timestamp: 1,
            run_id: "r9".to_string(),
            source: None,
            status: None,
        });
        h.registry.add_run(RunInfo {
            run_id: "r9".to_string(),
            experiment_id: "e9".to_string(),
            artifact_uri: None,
        });

        let err = h.publisher(clock()).run().await.unwrap_err();
        assert!(matches!(err, PublishError::ArtifactPathMissing(_)));
        assert_eq!(h.toolchain.calls(), vec!["health".to_string()]);
    }

    #[tokio::test]
    async fn test_teardown_of_missing_resources_proceeds_to_deploy() {
        let h = Harness::new().with_production_model();
        let report = h.publisher(clock()).run().await.unwrap();

        assert!(matches!(report.teardown.endpoint, TeardownOutcome::Absent(_)));
        assert!(matches!(report.teardown.endpoint_config, TeardownOutcome::Absent(_)));
        assert!(matches!(report.teardown.model, TeardownOutcome::Absent(_)));

        let calls = h.platform.calls();
        assert_eq!(
            &calls[..3],
            &[
                PlatformCall::Delete(ResourceKind::Endpoint, "deployed-model-application".to_string()),
                PlatformCall::Delete(
                    ResourceKind::EndpointConfig,
                    "deployed-model-application-config".to_string()
                ),
                PlatformCall::Delete(ResourceKind::Model, "deployed-model-application-model".to_string()),
            ]
        );
        assert!(matches!(calls[3], PlatformCall::Create(_)));
    }

    #[tokio::test]
    async fn test_refused_delete_does_not_stop_teardown() {
        let h = Harness::new().with_production_model();
        h.platform.insert(ResourceKind::Endpoint, "deployed-model-application");
        h.platform.insert(ResourceKind::EndpointConfig, "deployed-model-application-config");
        h.platform.insert(ResourceKind::Model, "deployed-model-application-model");
        h.platform.refuse_delete("deployed-model-application-config");

        let report = h.publisher(clock()).run().await.unwrap();
        assert_eq!(report.teardown.endpoint, TeardownOutcome::Deleted);
        assert!(matches!(report.teardown.endpoint_config, TeardownOutcome::Refused(_)));
        assert_eq!(report.teardown.model, TeardownOutcome::Deleted);
        assert_eq!(h.platform.deployments().len(), 1);
    }

    #[tokio::test]
    async fn test_refused_endpoint_delete_replaces_in_place() {
        let h = Harness::new().with_production_model();
        h.platform.insert(ResourceKind::Endpoint, "deployed-model-application");
        h.platform.insert(ResourceKind::EndpointConfig, "deployed-model-application-config");
        h.platform.insert(ResourceKind::Model, "deployed-model-application-model");
        h.platform.refuse_delete("deployed-model-application");

        let report = h.publisher(clock()).run().await.unwrap();
        assert!(matches!(report.teardown.endpoint, TeardownOutcome::Refused(_)));
        assert_eq!(report.teardown.endpoint_config, TeardownOutcome::Deleted);
        assert_eq!(report.teardown.model, TeardownOutcome::Deleted);

        assert_eq!(report.deployment.endpoint_name, "deployed-model-application");
        assert_eq!(h.platform.deployments().len(), 1);
        assert_eq!(h.platform.update_count(), 1);
        assert!(h.platform.exists(ResourceKind::Model, "deployed-model-application-model"));
    }

    #[tokio::test]
    async fn test_successive_runs_replace_deployment_with_new_tag() {
        let h = Harness::new().with_production_model();
        let clock = clock();

        let first = h.publisher(clock.clone()).run().await.unwrap();
        let second = h.publisher(clock).run().await.unwrap();

        assert_ne!(first.image, second.image);
        assert!(second.image > first.image);
        assert_eq!(second.teardown.endpoint, TeardownOutcome::Deleted);
        assert_eq!(h.platform.deployments().len(), 2);
        assert_eq!(h.images.tags("mlflow-deployment-pyfunc").len(), 2);
        // Repository created by the first run only.
        assert_eq!(h.images.created_count(), 1);
    }

    #[tokio::test]
    async fn test_unlisted_push_is_fatal() {
        let mut h = Harness::new().with_production_model();
        let images = h.images.clone();
        h.toolchain = Arc::new(FakeToolchain {
            drop_pushes: true,
            ..FakeToolchain::new(images)
        });

        let err = h.publisher(clock()).run().await.unwrap_err();
        assert!(matches!(err, PublishError::ImageNotPushed { .. }));
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_is_reported() {
        let h = Harness::new().with_production_model();
        h.platform.fail_create("ResourceLimitExceeded");

        let err = h.publisher(clock()).run().await.unwrap_err();
        match err {
            PublishError::Client { step, source } => {
                assert_eq!(step, "create deployment");
                assert!(source.to_string().contains("ResourceLimitExceeded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_config_validation() {
        let h = Harness::new();
        let mut cfg = h.config();
        assert!(cfg.validate().is_ok());

        cfg.account_id = "not-a-number".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = h.config();
        cfg.artifact_bucket = " ".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = h.config();
        cfg.instance_count = 0;
        assert!(cfg.validate().is_err());
    }
}
