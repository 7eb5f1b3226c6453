use std::fmt;

use chrono::{DateTime, Utc};

/// Tag format: second resolution, lexicographically ordered.
const TAG_FORMAT: &str = "%Y%m%d%H%M%S";

/// Fully-qualified container image reference in a remote registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Registry host, e.g. "123456789012.dkr.ecr.us-west-2.amazonaws.com".
    pub registry: String,
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    pub fn ecr(account_id: &str, region: &str, repository: &str, tag: &str) -> Self {
        Self {
            registry: ecr_registry_host(account_id, region),
            repository: repository.to_string(),
            tag: tag.to_string(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.registry, self.repository, self.tag)
    }
}

pub fn ecr_registry_host(account_id: &str, region: &str) -> String {
    format!("{account_id}.dkr.ecr.{region}.amazonaws.com")
}

/// Build the per-deployment image tag from a timestamp (UTC).
///
/// Two builds within the same second produce the same tag.
pub fn unique_tag(now: DateTime<Utc>) -> String {
    now.format(TAG_FORMAT).to_string()
}
