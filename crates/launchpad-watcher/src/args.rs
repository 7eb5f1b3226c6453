use std::time::Duration;

use clap::Parser;

use launchpad_common::{AwsArgs, RegistryArgs, TelemetryArgs};

use crate::poller::WatcherConfig;

/// Watch the model registry and trigger the deployment workflow on promotion.
#[derive(Debug, Parser)]
#[command(name = "launchpad-watcher")]
pub struct Args {
    #[command(flatten)]
    pub aws: AwsArgs,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub telemetry: TelemetryArgs,

    /// ARN of the state machine that runs the deployment.
    #[arg(long, env = "LAUNCHPAD_WORKFLOW_ARN")]
    pub workflow_arn: String,

    #[arg(long, env = "LAUNCHPAD_POLL_INTERVAL_SECS", default_value_t = 60)]
    pub poll_interval_secs: u64,

    /// Stop after this many polls. Runs until interrupted when unset.
    #[arg(long)]
    pub max_polls: Option<u64>,
}

impl Args {
    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            model_name: self.registry.model_name.clone(),
            stage: self.registry.stage,
            workflow_id: self.workflow_arn.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_polls: self.max_polls,
        }
    }
}
