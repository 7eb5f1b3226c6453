//! Container toolchain
//!
//! Narrow interface over the external build/tag/push processes so the
//! publisher can run against a fake in tests.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("failed to execute '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
}

#[async_trait]
pub trait ContainerToolchain: Send + Sync {
    /// Verify the container daemon is reachable.
    async fn health_check(&self) -> Result<(), ToolchainError>;

    /// Build the serving image from a model directory. Returns the local image reference.
    async fn build(&self, model_dir: &Path) -> Result<String, ToolchainError>;

    async fn tag(&self, source: &str, target: &str) -> Result<(), ToolchainError>;

    async fn push(&self, image: &str) -> Result<(), ToolchainError>;
}

/// Toolchain backed by the `docker` CLI and the MLflow serving-image builder.
#[derive(Debug, Clone)]
pub struct DockerToolchain {
    docker: String,
    /// Builder program followed by its arguments.
    builder: Vec<String>,
    /// Image the builder leaves in the local daemon.
    local_image: String,
}

impl DockerToolchain {
    pub fn new(docker: impl Into<String>, builder: Vec<String>, local_image: impl Into<String>) -> Self {
        Self {
            docker: docker.into(),
            builder,
            local_image: local_image.into(),
        }
    }

    /// `mlflow sagemaker build-and-push-container --no-push`, producing `mlflow-pyfunc:latest`.
    pub fn mlflow_default() -> Self {
        Self::new(
            "docker",
            ["mlflow", "sagemaker", "build-and-push-container", "--no-push"]
                .map(String::from)
                .to_vec(),
            "mlflow-pyfunc:latest",
        )
    }

    pub fn with_local_image(mut self, image: impl Into<String>) -> Self {
        self.local_image = image.into();
        self
    }
}

/// Run a command to completion; non-zero exit is an error.
async fn run(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<Output, ToolchainError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await.map_err(|source| ToolchainError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let command = format!("{} {}", program, args.join(" "));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stdout.trim().is_empty() {
        debug!(%command, "stdout: {}", stdout.trim());
    }
    if !stderr.trim().is_empty() {
        debug!(%command, "stderr: {}", stderr.trim());
    }

    if !output.status.success() {
        return Err(ToolchainError::Failed {
            command,
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(output)
}

#[async_trait]
impl ContainerToolchain for DockerToolchain {
    async fn health_check(&self) -> Result<(), ToolchainError> {
        run(&self.docker, &["info"], None).await?;
        Ok(())
    }

    async fn build(&self, model_dir: &Path) -> Result<String, ToolchainError> {
        let Some((program, args)) = self.builder.split_first() else {
            return Err(ToolchainError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty builder command"),
            });
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run(program, &args, Some(model_dir)).await?;
        Ok(self.local_image.clone())
    }

    async fn tag(&self, source: &str, target: &str) -> Result<(), ToolchainError> {
        run(&self.docker, &["tag", source, target], None).await?;
        Ok(())
    }

    async fn push(&self, image: &str) -> Result<(), ToolchainError> {
        run(&self.docker, &["push", image], None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_reports_exit_code() {
        let err = run("sh", &["-c", "echo boom >&2; exit 3"], None)
            .await
            .unwrap_err();
        match err {
            ToolchainError::Failed { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = run("launchpad-definitely-missing-binary", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_build_runs_in_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = DockerToolchain::new(
            "docker",
            vec!["sh".into(), "-c".into(), "touch built-here".into()],
            "local:latest",
        );
        let image = toolchain.build(dir.path()).await.unwrap();
        assert_eq!(image, "local:latest");
        assert!(dir.path().join("built-here").exists());
    }
}
