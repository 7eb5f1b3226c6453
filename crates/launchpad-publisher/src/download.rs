use std::path::PathBuf;

use tracing::{debug, info};

use launchpad_clients::ObjectStore;
use launchpad_common::artifact::KeyMapping;
use launchpad_common::ArtifactLocation;

use crate::pipeline::PublishError;

/// Mirror every object under the location's prefix into its local directory.
///
/// Objects are fetched one at a time. A failure part-way leaves the files
/// already written in place.
pub async fn download_artifacts(
    store: &dyn ObjectStore,
    bucket: &str,
    location: &ArtifactLocation,
) -> Result<Vec<PathBuf>, PublishError> {
    let keys = store
        .list_keys(bucket, &location.prefix)
        .await
        .map_err(|source| PublishError::client("list artifacts", source))?;

    let mut files = Vec::with_capacity(keys.len());
    for key in keys {
        let dest = match location.map_key(&key) {
            KeyMapping::File(path) => path,
            KeyMapping::Skip => {
                debug!(%key, "skipping directory marker");
                continue;
            }
            KeyMapping::Outside => return Err(PublishError::UnsafeObjectKey(key)),
        };

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| PublishError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        store
            .download(bucket, &key, &dest)
            .await
            .map_err(|source| PublishError::client("download artifact", source))?;
        info!(%bucket, %key, dest=%dest.display(), "downloaded artifact");
        files.push(dest);
    }

    Ok(files)
}
