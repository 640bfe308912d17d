use crate::config::Config;
use crate::domain::models::{ConnectorRecord, TeamMapping};
use crate::services::github::{GithubClient, GithubError};
use crate::services::storage::{team_mapping_path, write_json_pretty};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::BTreeSet;

#[derive(thiserror::Error, Debug)]
pub enum TeamError {
    #[error("fetching team mapping: {0}")]
    Fetch(#[from] GithubError),
    #[error("team mapping is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("team mapping is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("team mapping is not json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("team mapping must be an object of team -> connector keys")]
    NotAnObject,
    #[error("team {0} not found in team mapping")]
    UnknownTeam(String),
    #[error("team {team} lists a non-string connector key: {value}")]
    InvalidKey { team: String, value: String },
}

/// Decode a base64 file body as served by the contents API.
///
/// The API wraps the payload at 60 columns, so whitespace is dropped first.
pub fn decode_contents(content: &str) -> Result<serde_json::Value, TeamError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}

/// Keys listed under `team` in a `{team: [key, ...]}` document.
pub fn team_keys(document: &serde_json::Value, team: &str) -> Result<TeamMapping, TeamError> {
    let teams = document.as_object().ok_or(TeamError::NotAnObject)?;
    let listed = teams
        .get(team)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TeamError::UnknownTeam(team.to_string()))?;
    let mut keys = BTreeSet::new();
    for v in listed {
        let key = v.as_str().ok_or_else(|| TeamError::InvalidKey {
            team: team.to_string(),
            value: v.to_string(),
        })?;
        keys.insert(key.to_string());
    }
    Ok(TeamMapping {
        team: team.to_string(),
        keys,
    })
}

/// Anything that names the connector it belongs to.
pub trait Keyed {
    fn connector_key(&self) -> Option<&str>;
}

impl Keyed for ConnectorRecord {
    fn connector_key(&self) -> Option<&str> {
        Some(&self.key)
    }
}

/// Raw catalog entry; entries without a string `key` belong to nobody.
impl Keyed for serde_json::Value {
    fn connector_key(&self) -> Option<&str> {
        self.get("key").and_then(|k| k.as_str())
    }
}

/// Keep entries owned by the team, preserving order.
pub fn filter_by_team<T: Keyed>(records: Vec<T>, team: &TeamMapping) -> Vec<T> {
    records
        .into_iter()
        .filter(|r| r.connector_key().is_some_and(|k| team.contains(k)))
        .collect()
}

/// Fetch the ownership document, extract `team`, and persist its key list.
pub fn fetch_team_mapping(
    github: &GithubClient<'_>,
    config: &Config,
    team: &str,
) -> anyhow::Result<TeamMapping> {
    let content = github
        .repo_contents(
            &config.github.owner,
            &config.github.mapping_repo,
            &config.github.mapping_path,
        )
        .map_err(TeamError::from)?;
    let document = decode_contents(&content)?;
    let mapping = team_keys(&document, team)?;

    let path = team_mapping_path(&config.workdir);
    write_json_pretty(&path, &mapping.keys)?;
    tracing::info!(team, connectors = mapping.keys.len(), path = %path.display(), "team mapping fetched");
    Ok(mapping)
}
