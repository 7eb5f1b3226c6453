//! Promotion poller
//!
//! Polls the registry for the newest version in the watched stage and starts
//! the deployment workflow once per new creation timestamp.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use launchpad_clients::{ClientError, ModelRegistry, WorkflowTrigger};
use launchpad_common::{ModelVersion, Stage};

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub model_name: String,
    pub stage: Stage,
    /// Workflow to start on promotion (state machine ARN).
    pub workflow_id: String,
    pub poll_interval: Duration,
    pub max_polls: Option<u64>,
}

impl WatcherConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model_name.is_empty() {
            anyhow::bail!("model_name cannot be empty");
        }
        if self.workflow_id.is_empty() {
            anyhow::bail!("workflow_id cannot be empty");
        }
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }
        Ok(())
    }
}

/// What a finished watcher run did.
#[derive(Debug, Clone, Default)]
pub struct WatchSummary {
    pub polls: u64,
    pub triggered: u64,
    pub last: Option<Promotion>,
}

/// A promotion the watcher acted on.
#[derive(Debug, Clone)]
pub struct Promotion {
    pub version: ModelVersion,
    pub execution_id: String,
}

pub struct PromotionWatcher {
    config: WatcherConfig,
    registry: Arc<dyn ModelRegistry>,
    trigger: Arc<dyn WorkflowTrigger>,
    /// Creation timestamp of the last version a trigger was delivered for.
    watermark: i64,
}

impl PromotionWatcher {
    pub fn new(
        config: WatcherConfig,
        registry: Arc<dyn ModelRegistry>,
        trigger: Arc<dyn WorkflowTrigger>,
    ) -> Self {
        Self {
            config,
            registry,
            trigger,
            watermark: 0,
        }
    }

    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    /// One poll: trigger if the newest staged version is strictly newer than the watermark.
    ///
    /// The watermark advances only after the trigger call succeeds.
    pub async fn poll_once(&mut self) -> Result<Option<Promotion>, ClientError> {
        let versions = self
            .registry
            .latest_versions(&self.config.model_name, self.config.stage)
            .await?;

        let Some(version) = ModelVersion::newest(versions) else {
            debug!(model=%self.config.model_name, stage=%self.config.stage, "no staged version");
            return Ok(None);
        };

        if version.creation_timestamp <= self.watermark {
            debug!(
                version=%version.version,
                timestamp = version.creation_timestamp,
                watermark = self.watermark,
                "no new promotion"
            );
            return Ok(None);
        }

        info!(
            model=%version.name,
            version=%version.version,
            timestamp = version.creation_timestamp,
            "new model version found"
        );

        let execution_id = self
            .trigger
            .start_execution(&self.config.workflow_id, &serde_json::json!({}))
            .await?;
        self.watermark = version.creation_timestamp;

        info!(execution=%execution_id, "deployment workflow triggered");
        Ok(Some(Promotion {
            version,
            execution_id,
        }))
    }

    /// Poll until `cancel` fires or `max_polls` is reached.
    ///
    /// A failed poll is logged and retried on the next tick.
    pub async fn run(&mut self, cancel: CancellationToken) -> WatchSummary {
        info!(
            model=%self.config.model_name,
            stage=%self.config.stage,
            interval=?self.config.poll_interval,
            "starting promotion watcher"
        );

        let mut summary = WatchSummary::default();

        while !cancel.is_cancelled() {
            match self.poll_once().await {
                Ok(Some(p)) => {
                    summary.triggered += 1;
                    summary.last = Some(p);
                }
                Ok(None) => {}
                Err(e) => error!(error=%e, "poll cycle failed"),
            }

            summary.polls += 1;
            if self.config.max_polls.is_some_and(|max| summary.polls >= max) {
                info!(polls = summary.polls, "poll limit reached");
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!(
            polls = summary.polls,
            triggered = summary.triggered,
            "promotion watcher stopped"
        );
        summary
    }
}
