use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// One connector entry of an environment catalog.
///
/// Catalog entries carry many more fields; only the ones compared across
/// environments are decoded.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRecord {
    pub key: String,
    #[serde(deserialize_with = "version_string")]
    pub latest_version: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub has_http_request: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Number(serde_json::Number),
}

fn version_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match RawVersion::deserialize(d)? {
        RawVersion::Text(s) => s,
        RawVersion::Number(n) => n.to_string(),
    })
}

fn null_as_false<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or_default())
}

/// Connector keys owned by one team.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct TeamMapping {
    pub team: String,
    pub keys: BTreeSet<String>,
}

impl TeamMapping {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// The compared side of one connector in one environment.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SideState {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_http_request: Option<bool>,
}

/// A connector whose tracked fields differ between the two environments.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Difference {
    pub key: String,
    pub lower: SideState,
    pub higher: SideState,
}

/// A difference paired with the change manifest it links to.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DifferenceRecord {
    #[serde(flatten)]
    pub difference: Difference,
    pub changes: String,
}

/// Commit messages between two version tags of one connector.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ChangeManifest {
    pub key: String,
    pub from_version: String,
    pub to_version: String,
    pub messages: Vec<String>,
}

#[derive(Serialize)]
pub struct CompareReport {
    pub lower: String,
    pub higher: String,
    pub team: String,
    pub team_keys: usize,
    pub tracked_fields: Vec<String>,
    pub report_path: String,
    pub differences: Vec<DifferenceRecord>,
}

#[derive(Serialize)]
pub struct FetchReport {
    pub environment: String,
    pub snapshot: String,
    pub connectors: usize,
}

#[derive(Serialize)]
pub struct EnvironmentItem {
    pub name: String,
    pub source: String,
}

#[derive(Serialize)]
pub struct AuthReport {
    pub login: String,
}

#[derive(Serialize)]
pub struct CleanReport {
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}
