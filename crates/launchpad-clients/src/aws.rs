//! Shared AWS SDK plumbing: config loading and error classification.

use std::error::Error as StdError;
use std::fmt::Debug;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

use crate::error::ClientError;

/// Load SDK configuration for `region`, optionally from a named profile.
pub async fn load_sdk_config(region: &str, profile: Option<&str>) -> SdkConfig {
    let loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
    match profile {
        Some(profile) => loader.profile_name(profile).load().await,
        None => loader.load().await,
    }
}

/// Classify an SDK failure into a [`ClientError`].
///
/// Service answers become `NotFound` or `Rejected`; anything that never reached
/// the service becomes `Transport`.
pub(crate) fn sdk_error<E, R>(service: &'static str, err: SdkError<E, R>) -> ClientError
where
    E: StdError + ProvideErrorMetadata + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(ctx) => {
            let code = ctx.err().code().unwrap_or("Unknown").to_string();
            let message = ctx.err().message().unwrap_or_default().to_string();
            if looks_like_not_found(&code, &message) {
                ClientError::NotFound(format!("{service}: {message}"))
            } else {
                ClientError::Rejected {
                    service,
                    code,
                    message: if message.is_empty() { detail } else { message },
                }
            }
        }
        _ => ClientError::Transport {
            service,
            message: detail,
        },
    }
}

// SageMaker reports missing resources as a generic ValidationException.
fn looks_like_not_found(code: &str, message: &str) -> bool {
    code.contains("NotFound")
        || code == "NoSuchKey"
        || code == "NoSuchBucket"
        || message.starts_with("Could not find")
}
