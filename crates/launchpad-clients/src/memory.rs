//! In-memory collaborators for tests and dry runs.
//!
//! Each store keeps its state behind a mutex and records the calls it
//! receives so callers can assert on ordering and parameters.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use launchpad_common::{DeployMode, DeploymentRequest, ModelVersion, RunInfo, Stage};

use crate::error::{ClientError, Result};
use crate::types::{
    DeploymentStatus, ImageDetail, ImageRegistry, InferencePlatform, ModelRegistry, ObjectStore,
    WorkflowTrigger,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(service: &'static str, message: &str) -> ClientError {
    ClientError::Transport {
        service,
        message: message.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Model registry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryModelRegistry {
    versions: Mutex<Vec<ModelVersion>>,
    runs: Mutex<HashMap<String, RunInfo>>,
    failures: AtomicUsize,
    queries: AtomicUsize,
}

impl MemoryModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every registered version.
    pub fn set_versions(&self, versions: Vec<ModelVersion>) {
        *lock(&self.versions) = versions;
    }

    pub fn add_version(&self, version: ModelVersion) {
        lock(&self.versions).push(version);
    }

    pub fn add_run(&self, run: RunInfo) {
        lock(&self.runs).insert(run.run_id.clone(), run);
    }

    /// Make the next `n` version queries fail with a transport error.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelRegistry for MemoryModelRegistry {
    async fn latest_versions(&self, model_name: &str, stage: Stage) -> Result<Vec<ModelVersion>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.failures) {
            return Err(injected("memory-registry", "injected failure"));
        }

        // Latest version per stage, like the tracking server.
        let latest = lock(&self.versions)
            .iter()
            .filter(|v| v.name == model_name && v.current_stage == stage)
            .max_by_key(|v| v.creation_timestamp)
            .cloned();
        Ok(latest.into_iter().collect())
    }

    async fn get_run(&self, run_id: &str) -> Result<RunInfo> {
        lock(&self.runs)
            .get(run_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("run {run_id}")))
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    buckets: Mutex<BTreeSet<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        lock(&self.buckets).insert(bucket.to_string());
        lock(&self.objects).insert((bucket.to_string(), key.to_string()), data.into());
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        lock(&self.buckets).contains(bucket)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(lock(&self.objects)
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        let data = self
            .get(bucket, key)
            .ok_or_else(|| ClientError::NotFound(format!("s3://{bucket}/{key}")))?;
        tokio::fs::write(dest, data).await?;
        Ok(())
    }

    async fn upload(&self, bucket: &str, key: &str, src: &Path) -> Result<()> {
        let data = tokio::fs::read(src).await?;
        self.put(bucket, key, data);
        Ok(())
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        lock(&self.buckets).insert(bucket.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Image registry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryImageRegistry {
    repositories: Mutex<BTreeMap<String, Vec<String>>>,
    created: AtomicUsize,
}

impl MemoryImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pushed tag, creating the repository entry if needed.
    pub fn record_push(&self, repository: &str, tag: &str) {
        lock(&self.repositories)
            .entry(repository.to_string())
            .or_default()
            .push(tag.to_string());
    }

    pub fn tags(&self, repository: &str) -> Vec<String> {
        lock(&self.repositories)
            .get(repository)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `create_repository` calls served.
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageRegistry for MemoryImageRegistry {
    async fn repository_exists(&self, repository: &str) -> Result<bool> {
        Ok(lock(&self.repositories).contains_key(repository))
    }

    async fn create_repository(&self, repository: &str) -> Result<()> {
        let mut repos = lock(&self.repositories);
        if repos.contains_key(repository) {
            return Err(ClientError::Rejected {
                service: "memory-registry",
                code: "RepositoryAlreadyExistsException".to_string(),
                message: format!("repository {repository} exists"),
            });
        }
        repos.insert(repository.to_string(), Vec::new());
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_image(&self, repository: &str, tag: &str) -> Result<Option<ImageDetail>> {
        let repos = lock(&self.repositories);
        let Some(tags) = repos.get(repository) else {
            return Err(ClientError::NotFound(format!("repository {repository}")));
        };
        Ok(tags.iter().any(|t| t == tag).then(|| ImageDetail {
            repository: repository.to_string(),
            tags: vec![tag.to_string()],
            digest: None,
        }))
    }
}

// ---------------------------------------------------------------------------
// Inference platform
// ---------------------------------------------------------------------------

/// Kind of inference resource, used in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Endpoint,
    EndpointConfig,
    Model,
}

/// One call received by [`MemoryInferencePlatform`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Delete(ResourceKind, String),
    Create(DeploymentRequest),
}

#[derive(Debug, Default)]
pub struct MemoryInferencePlatform {
    live: Mutex<BTreeSet<(u8, String)>>,
    calls: Mutex<Vec<PlatformCall>>,
    refuse_deletes: Mutex<BTreeSet<String>>,
    fail_create: Mutex<Option<String>>,
    updates: AtomicUsize,
}

fn kind_key(kind: ResourceKind) -> u8 {
    match kind {
        ResourceKind::Endpoint => 0,
        ResourceKind::EndpointConfig => 1,
        ResourceKind::Model => 2,
    }
}

impl MemoryInferencePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, kind: ResourceKind, name: &str) {
        lock(&self.live).insert((kind_key(kind), name.to_string()));
    }

    pub fn exists(&self, kind: ResourceKind, name: &str) -> bool {
        lock(&self.live).contains(&(kind_key(kind), name.to_string()))
    }

    /// Deletes of `name` are refused as if the resource were in use.
    pub fn refuse_delete(&self, name: &str) {
        lock(&self.refuse_deletes).insert(name.to_string());
    }

    pub fn fail_create(&self, message: &str) {
        *lock(&self.fail_create) = Some(message.to_string());
    }

    /// Deployments that replaced a live endpoint in place.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        lock(&self.calls).clone()
    }

    pub fn deployments(&self) -> Vec<DeploymentRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Create(req) => Some(req),
                PlatformCall::Delete(..) => None,
            })
            .collect()
    }

    fn delete(&self, kind: ResourceKind, name: &str) -> Result<()> {
        lock(&self.calls).push(PlatformCall::Delete(kind, name.to_string()));
        if lock(&self.refuse_deletes).contains(name) {
            return Err(ClientError::Rejected {
                service: "memory-platform",
                code: "ValidationException".to_string(),
                message: format!("cannot delete {name}"),
            });
        }
        if lock(&self.live).remove(&(kind_key(kind), name.to_string())) {
            Ok(())
        } else {
            Err(ClientError::NotFound(format!("{kind:?} {name}")))
        }
    }
}

#[async_trait]
impl InferencePlatform for MemoryInferencePlatform {
    async fn delete_endpoint(&self, name: &str) -> Result<()> {
        self.delete(ResourceKind::Endpoint, name)
    }

    async fn delete_endpoint_config(&self, name: &str) -> Result<()> {
        self.delete(ResourceKind::EndpointConfig, name)
    }

    async fn delete_model(&self, name: &str) -> Result<()> {
        self.delete(ResourceKind::Model, name)
    }

    async fn create_deployment(&self, request: &DeploymentRequest) -> Result<DeploymentStatus> {
        lock(&self.calls).push(PlatformCall::Create(request.clone()));
        if let Some(message) = lock(&self.fail_create).clone() {
            return Err(ClientError::Rejected {
                service: "memory-platform",
                code: "EndpointFailed".to_string(),
                message,
            });
        }
        let existing = self.exists(ResourceKind::Endpoint, &request.name);
        if existing && request.config.mode != DeployMode::Replace {
            return Err(ClientError::Rejected {
                service: "memory-platform",
                code: "ValidationException".to_string(),
                message: format!("endpoint {} already exists", request.name),
            });
        }
        self.insert(ResourceKind::Model, &request.config.model_name);
        self.insert(ResourceKind::EndpointConfig, &request.config.endpoint_config_name);
        if existing {
            self.updates.fetch_add(1, Ordering::SeqCst);
        } else {
            self.insert(ResourceKind::Endpoint, &request.name);
        }
        Ok(DeploymentStatus {
            endpoint_name: request.name.clone(),
            endpoint_arn: None,
            status: "InService".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Workflow trigger
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryWorkflowTrigger {
    executions: Mutex<Vec<(String, serde_json::Value)>>,
    failures: AtomicUsize,
}

impl MemoryWorkflowTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` trigger calls fail with a transport error.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn executions(&self) -> Vec<(String, serde_json::Value)> {
        lock(&self.executions).clone()
    }
}

#[async_trait]
impl WorkflowTrigger for MemoryWorkflowTrigger {
    async fn start_execution(&self, workflow_id: &str, input: &serde_json::Value) -> Result<String> {
        if take_failure(&self.failures) {
            return Err(injected("memory-trigger", "injected failure"));
        }
        let mut executions = lock(&self.executions);
        executions.push((workflow_id.to_string(), input.clone()));
        Ok(format!("{workflow_id}:execution-{}", executions.len()))
    }
}
