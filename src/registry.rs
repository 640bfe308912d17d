use crate::config::Config;
use crate::domain::models::{ConnectorRecord, TeamMapping};
use crate::services::storage::{snapshot_path, write_json_pretty};
use crate::services::team::{filter_by_team, Keyed};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("no snapshot for environment {environment} at {path}")]
    SnapshotMissing { environment: String, path: PathBuf },
    #[error("reading snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("snapshot {path} is not a connector list: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("connector {key} in {environment} snapshot is malformed: {source}")]
    Record {
        environment: String,
        key: String,
        source: serde_json::Error,
    },
}

/// Blocking client shared by every remote call of a run.
pub fn build_client(timeout: Option<Duration>) -> anyhow::Result<reqwest::blocking::Client> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("connector-diff/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

fn fetch_registry_text(client: &reqwest::blocking::Client, url: &str) -> anyhow::Result<String> {
    let resp = client.get(url).send()?.error_for_status()?;
    Ok(resp.text()?)
}

/// Download the full catalog of `environment` and store it as its snapshot.
pub fn refresh_snapshot(
    client: &reqwest::blocking::Client,
    config: &Config,
    environment: &str,
) -> anyhow::Result<PathBuf> {
    let url = config.registry_url(environment)?;
    let body = fetch_registry_text(client, url)?;
    let catalog: serde_json::Value = serde_json::from_str(&body)?;
    let path = snapshot_path(&config.workdir, environment);
    write_json_pretty(&path, &catalog)?;
    tracing::info!(env = environment, path = %path.display(), "registry snapshot written");
    Ok(path)
}

/// Raw catalog entries of one environment's snapshot.
///
/// Entries stay undecoded so that connectors the team does not own can never
/// fail a run.
pub fn load_snapshot(workdir: &Path, environment: &str) -> Result<Vec<serde_json::Value>, RegistryError> {
    let path = snapshot_path(workdir, environment);
    if !path.exists() {
        return Err(RegistryError::SnapshotMissing {
            environment: environment.to_string(),
            path,
        });
    }
    let raw = std::fs::read_to_string(&path).map_err(|source| RegistryError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| RegistryError::Parse { path, source })
}

/// Team-owned records of a stored snapshot, decoded after filtering.
pub fn team_records(
    workdir: &Path,
    environment: &str,
    team: &TeamMapping,
) -> Result<Vec<ConnectorRecord>, RegistryError> {
    filter_by_team(load_snapshot(workdir, environment)?, team)
        .into_iter()
        .map(|entry| {
            let key = entry.connector_key().unwrap_or_default().to_string();
            serde_json::from_value(entry).map_err(|source| RegistryError::Record {
                environment: environment.to_string(),
                key,
                source,
            })
        })
        .collect()
}

/// Team-owned connector records of one environment, in snapshot order.
///
/// Fetchable environments are refreshed first. A failed refresh is logged and
/// the snapshot already on disk, if any, is used instead.
pub fn environment_records(
    client: &reqwest::blocking::Client,
    config: &Config,
    environment: &str,
    team: &TeamMapping,
) -> anyhow::Result<Vec<ConnectorRecord>> {
    let env = config.environment(environment)?;
    if env.url.is_some() {
        if let Err(e) = refresh_snapshot(client, config, environment) {
            tracing::error!(env = environment, error = %e, "registry fetch failed");
        }
    }
    Ok(team_records(&config.workdir, environment, team)?)
}
