use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Registry stage a model version can be assigned to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    None,
    Staging,
    Production,
    Archived,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::None => "None",
            Stage::Staging => "Staging",
            Stage::Production => "Production",
            Stage::Archived => "Archived",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Stage::None),
            "staging" => Ok(Stage::Staging),
            "production" => Ok(Stage::Production),
            "archived" => Ok(Stage::Archived),
            other => Err(format!("unknown stage: {other}")),
        }
    }
}

/// A registered model version as returned by the tracking server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelVersion {
    pub name: String,

    /// Version number, kept as the registry's string form (e.g. "3").
    pub version: String,

    #[serde(default)]
    pub current_stage: Stage,

    /// Creation time in ms since epoch.
    #[serde(deserialize_with = "lenient_i64")]
    pub creation_timestamp: i64,

    #[serde(default)]
    pub run_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ModelVersion {
    /// Pick the newest version (by creation timestamp) out of a registry answer.
    pub fn newest(versions: Vec<ModelVersion>) -> Option<ModelVersion> {
        versions.into_iter().max_by_key(|v| v.creation_timestamp)
    }
}

/// The subset of run metadata needed to locate artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunInfo {
    pub run_id: String,
    pub experiment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_uri: Option<String>,
}

// The tracking server may encode int64 fields either as JSON numbers or strings.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registry_payload() {
        let raw = r#"{
            "name": "sample_model",
            "version": "3",
            "creation_timestamp": 1000,
            "last_updated_timestamp": 1200,
            "current_stage": "Production",
            "source": "s3://bucket/e1/r1/artifacts/random-forest-model",
            "run_id": "r1",
            "status": "READY"
        }"#;
        let v: ModelVersion = serde_json::from_str(raw).unwrap();
        assert_eq!(v.version, "3");
        assert_eq!(v.current_stage, Stage::Production);
        assert_eq!(v.creation_timestamp, 1000);
        assert_eq!(v.run_id, "r1");
    }

    #[test]
    fn test_timestamp_as_string() {
        let raw = r#"{"name":"m","version":"1","creation_timestamp":"1700000000000","run_id":"r"}"#;
        let v: ModelVersion = serde_json::from_str(raw).unwrap();
        assert_eq!(v.creation_timestamp, 1_700_000_000_000);
        assert_eq!(v.current_stage, Stage::None);
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!("production".parse::<Stage>().unwrap(), Stage::Production);
        assert_eq!("Staging".parse::<Stage>().unwrap(), Stage::Staging);
        assert!("live".parse::<Stage>().is_err());
    }

    #[test]
    fn test_newest_picks_latest_timestamp() {
        let mk = |version: &str, ts: i64| ModelVersion {
            name: "m".to_string(),
            version: version.to_string(),
            current_stage: Stage::Production,
            creation_timestamp: ts,
            run_id: format!("run-{version}"),
            source: None,
            status: None,
        };
        let newest = ModelVersion::newest(vec![mk("1", 10), mk("3", 30), mk("2", 20)]).unwrap();
        assert_eq!(newest.version, "3");
        assert!(ModelVersion::newest(Vec::new()).is_none());
    }
}
