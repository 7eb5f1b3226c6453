pub mod artifact;
pub mod clock;
pub mod deployment;
pub mod image;
pub mod model_version;
pub mod settings;
pub mod telemetry;

pub use artifact::ArtifactLocation;
pub use clock::{Clock, SystemClock};
pub use deployment::{DeployMode, DeploymentConfig, DeploymentRequest, InferenceResources};
pub use image::{unique_tag, ImageRef};
pub use model_version::{ModelVersion, RunInfo, Stage};
pub use settings::{AwsArgs, RegistryArgs, TelemetryArgs};
