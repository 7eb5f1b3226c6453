use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecr::types::ImageIdentifier;
use aws_sdk_ecr::Client;

use crate::aws::sdk_error;
use crate::error::{ClientError, Result};
use crate::types::{ImageDetail, ImageRegistry};

const SERVICE: &str = "ecr";

#[derive(Debug, Clone)]
pub struct EcrRegistry {
    client: Client,
}

impl EcrRegistry {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ImageRegistry for EcrRegistry {
    async fn repository_exists(&self, repository: &str) -> Result<bool> {
        let resp = self
            .client
            .describe_repositories()
            .repository_names(repository)
            .send()
            .await;
        match resp {
            Ok(out) => Ok(!out.repositories().is_empty()),
            Err(e) => match sdk_error(SERVICE, e) {
                ClientError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn create_repository(&self, repository: &str) -> Result<()> {
        let out = self
            .client
            .create_repository()
            .repository_name(repository)
            .send()
            .await
            .map_err(|e| sdk_error(SERVICE, e))?;
        let uri = out
            .repository()
            .and_then(|r| r.repository_uri())
            .unwrap_or_default();
        tracing::debug!(repository, uri, "repository created");
        Ok(())
    }

    async fn find_image(&self, repository: &str, tag: &str) -> Result<Option<ImageDetail>> {
        let resp = self
            .client
            .describe_images()
            .repository_name(repository)
            .image_ids(ImageIdentifier::builder().image_tag(tag).build())
            .send()
            .await;

        let out = match resp {
            Ok(out) => out,
            Err(e) => {
                return match sdk_error(SERVICE, e) {
                    ClientError::NotFound(_) => Ok(None),
                    other => Err(other),
                };
            }
        };

        Ok(out.image_details().first().map(|d| ImageDetail {
            repository: d.repository_name().unwrap_or(repository).to_string(),
            tags: d.image_tags().to_vec(),
            digest: d.image_digest().map(str::to_string),
        }))
    }
}
