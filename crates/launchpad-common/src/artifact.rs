use std::path::{Component, Path, PathBuf};

/// Where a run's model artifacts live in the object store and where they are
/// mirrored to on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    /// Object-store prefix, always terminated by `/`.
    /// Format: `{experiment}/{run}/artifacts/{subdir}/`.
    pub prefix: String,

    /// Local directory mirroring the prefix: `{scratch}/{experiment}/{run}/artifacts/{subdir}`.
    pub local_dir: PathBuf,
}

/// How a listed object key maps onto the local tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMapping {
    /// Copy the object to this local file.
    File(PathBuf),
    /// Directory marker or the prefix itself; nothing to download.
    Skip,
    /// Key lies outside the prefix or would escape the local directory.
    Outside,
}

impl ArtifactLocation {
    pub fn new(
        experiment_id: &str,
        run_id: &str,
        subdir: &str,
        scratch_root: impl AsRef<Path>,
    ) -> Self {
        let subdir = subdir.trim_matches('/');
        let relative = format!("{experiment_id}/{run_id}/artifacts/{subdir}");
        Self {
            prefix: format!("{relative}/"),
            local_dir: scratch_root.as_ref().join(&relative),
        }
    }

    /// Map an object key returned by a prefix listing to its local path.
    pub fn map_key(&self, key: &str) -> KeyMapping {
        let Some(rest) = key.strip_prefix(&self.prefix) else {
            return KeyMapping::Outside;
        };
        if rest.is_empty() || rest.ends_with('/') {
            return KeyMapping::Skip;
        }

        // Empty segments ("a//b", a leading "/") are legal in object keys.
        let mut relative = PathBuf::new();
        for segment in rest.split('/').filter(|s| !s.is_empty() && *s != ".") {
            let mut parts = Path::new(segment).components();
            match (parts.next(), parts.next()) {
                (Some(Component::Normal(part)), None) => relative.push(part),
                _ => return KeyMapping::Outside,
            }
        }
        if relative.as_os_str().is_empty() {
            return KeyMapping::Skip;
        }

        KeyMapping::File(self.local_dir.join(relative))
    }
}
