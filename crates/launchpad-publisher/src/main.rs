mod args;
mod download;
mod pipeline;
mod toolchain;

use std::sync::Arc;

use clap::Parser;

use launchpad_clients::aws::load_sdk_config;
use launchpad_clients::{EcrRegistry, MlflowRegistry, ObjectStore, S3ObjectStore, SageMakerPlatform};
use launchpad_common::telemetry::init_tracing;
use launchpad_common::SystemClock;

use crate::args::Args;
use crate::pipeline::{Collaborators, Publisher};
use crate::toolchain::DockerToolchain;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let telemetry = init_tracing("launchpad-publisher", &args.telemetry);

    let config = args.publisher_config();
    if let Err(e) = config.validate() {
        tracing::error!(error=%e, "invalid configuration");
        telemetry.shutdown();
        std::process::exit(2);
    }

    tracing::info!(
        model=%config.model_name,
        stage=%config.stage,
        region=%config.region,
        app=%config.app_name,
        "launchpad-publisher starting"
    );

    let sdk_config = load_sdk_config(&args.aws.region, args.aws.profile.as_deref()).await;
    let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(&sdk_config));
    let deps = Collaborators {
        registry: Arc::new(MlflowRegistry::new(
            &args.registry.tracking_uri,
            args.registry.tracking_token.clone(),
        )),
        store: store.clone(),
        images: Arc::new(EcrRegistry::new(&sdk_config)),
        platform: Arc::new(SageMakerPlatform::new(
            &sdk_config,
            store,
            args.deployment_bucket(),
        )),
        toolchain: Arc::new(DockerToolchain::mlflow_default().with_local_image(&args.local_image)),
    };

    let publisher = Publisher::new(config, deps, Arc::new(SystemClock));
    match publisher.run().await {
        Ok(report) => {
            tracing::info!(
                version=%report.model_version,
                image=%report.image,
                endpoint=%report.deployment.endpoint_name,
                status=%report.deployment.status,
                "publish complete"
            );
            if let Ok(json) = serde_json::to_string(&report) {
                println!("{json}");
            }
        }
        Err(e) => {
            tracing::error!(error=%e, "publish failed");
            telemetry.shutdown();
            std::process::exit(1);
        }
    }

    telemetry.shutdown();
    Ok(())
}
