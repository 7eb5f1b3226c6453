//! MLflow tracking server client (REST API 2.0).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use launchpad_common::{ModelVersion, RunInfo, Stage};

use crate::error::{ClientError, Result};
use crate::types::ModelRegistry;

const SERVICE: &str = "mlflow";

#[derive(Debug, Clone)]
pub struct MlflowRegistry {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl MlflowRegistry {
    pub fn new(tracking_uri: &str, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: tracking_uri.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/2.0/mlflow{}", self.base_url, path)
    }

    fn auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        }
    }
}

#[derive(Serialize)]
struct LatestVersionsRequest<'a> {
    name: &'a str,
    stages: [&'a str; 1],
}

#[derive(Deserialize)]
struct LatestVersionsResponse {
    // Omitted entirely when no version carries the stage.
    #[serde(default)]
    model_versions: Vec<ModelVersion>,
}

#[derive(Deserialize)]
struct GetRunResponse {
    run: RunEnvelope,
}

#[derive(Deserialize)]
struct RunEnvelope {
    info: RunInfo,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

/// Turn a non-success response into a [`ClientError`].
async fn error_from(resp: Response) -> ClientError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
    let (code, message) = match body {
        Some(b) => (b.error_code, b.message),
        None => (status.as_str().to_string(), text),
    };

    if status == StatusCode::NOT_FOUND || code == "RESOURCE_DOES_NOT_EXIST" {
        ClientError::NotFound(format!("{SERVICE}: {message}"))
    } else if status.is_server_error() {
        ClientError::Transport {
            service: SERVICE,
            message: format!("status {status}: {message}"),
        }
    } else {
        ClientError::Rejected {
            service: SERVICE,
            code,
            message,
        }
    }
}

#[async_trait]
impl ModelRegistry for MlflowRegistry {
    async fn latest_versions(&self, model_name: &str, stage: Stage) -> Result<Vec<ModelVersion>> {
        let url = self.api_url("/registered-models/get-latest-versions");
        let body = LatestVersionsRequest {
            name: model_name,
            stages: [stage.as_str()],
        };
        tracing::debug!(%url, model=%model_name, %stage, "querying latest versions");

        let resp = self.auth(self.http.post(&url)).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        let parsed: LatestVersionsResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        // The server filters by stage already; keep the check in case of a
        // server that ignores the filter.
        Ok(parsed
            .model_versions
            .into_iter()
            .filter(|v| v.current_stage == stage)
            .collect())
    }

    async fn get_run(&self, run_id: &str) -> Result<RunInfo> {
        let url = self.api_url("/runs/get");
        let resp = self
            .auth(self.http.get(&url))
            .query(&[("run_id", run_id)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        let parsed: GetRunResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(parsed.run.info)
    }
}
