pub mod aws;
pub mod ecr;
pub mod error;
pub mod memory;
pub mod mlflow;
pub mod s3;
pub mod sagemaker;
pub mod sfn;
pub mod types;

pub use ecr::EcrRegistry;
pub use error::{ClientError, Result};
pub use mlflow::MlflowRegistry;
pub use s3::S3ObjectStore;
pub use sagemaker::SageMakerPlatform;
pub use sfn::StepFunctionsTrigger;
pub use types::{ImageRegistry, InferencePlatform, ModelRegistry, ObjectStore, WorkflowTrigger};
