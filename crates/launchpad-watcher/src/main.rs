mod args;
mod poller;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use launchpad_clients::aws::load_sdk_config;
use launchpad_clients::{MlflowRegistry, StepFunctionsTrigger};
use launchpad_common::telemetry::init_tracing;

use crate::args::Args;
use crate::poller::PromotionWatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let telemetry = init_tracing("launchpad-watcher", &args.telemetry);

    let config = args.watcher_config();
    if let Err(e) = config.validate() {
        tracing::error!(error=%e, "invalid configuration");
        telemetry.shutdown();
        std::process::exit(2);
    }

    tracing::info!(
        tracking_uri=%args.registry.tracking_uri,
        region=%args.aws.region,
        "launchpad-watcher starting"
    );

    let sdk_config = load_sdk_config(&args.aws.region, args.aws.profile.as_deref()).await;
    let registry = Arc::new(MlflowRegistry::new(
        &args.registry.tracking_uri,
        args.registry.tracking_token.clone(),
    ));
    let trigger = Arc::new(StepFunctionsTrigger::new(&sdk_config));

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let mut watcher = PromotionWatcher::new(config, registry, trigger);
    let summary = watcher.run(cancel).await;
    if let Some(last) = &summary.last {
        tracing::info!(
            triggered = summary.triggered,
            version=%last.version.version,
            execution=%last.execution_id,
            "last triggered deployment"
        );
    }

    telemetry.shutdown();
    Ok(())
}

async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error=%e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutdown signal received");
    cancel.cancel();
}
