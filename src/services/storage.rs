use serde::Serialize;
use std::path::{Path, PathBuf};

pub const OUTPUT_DIR: &str = "output";
pub const TEAM_MAPPING_FILE: &str = "team-connectors.json";
const SNAPSHOT_PREFIX: &str = "connector-details-";

pub fn snapshot_path(workdir: &Path, environment: &str) -> PathBuf {
    workdir.join(format!("{}{}.json", SNAPSHOT_PREFIX, environment))
}

pub fn team_mapping_path(workdir: &Path) -> PathBuf {
    workdir.join(TEAM_MAPPING_FILE)
}

pub fn output_dir(workdir: &Path) -> PathBuf {
    workdir.join(OUTPUT_DIR)
}

pub fn report_path(workdir: &Path, lower: &str, higher: &str) -> PathBuf {
    output_dir(workdir).join(format!("connector-diff-{}-{}.html", lower, higher))
}

pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

/// Files and directories written by previous runs.
///
/// Only fetchable environments are listed: pre-seeded snapshots are inputs.
pub fn generated_paths(workdir: &Path, fetchable: &[&str]) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = fetchable
        .iter()
        .map(|env| snapshot_path(workdir, env))
        .collect();
    out.push(team_mapping_path(workdir));
    out.push(output_dir(workdir));
    out
}

/// Remove `path` if present. Returns whether something was removed.
pub fn remove_path(path: &Path) -> std::io::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    if path.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    Ok(true)
}
