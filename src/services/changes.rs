use crate::config::Config;
use crate::domain::models::ChangeManifest;
use crate::services::github::{GithubClient, GithubError};
use crate::services::storage::{output_dir, write_json_pretty};

/// Artifact name for the range between two versions of `key`.
///
/// Path separators in any part become `_` so the file stays inside `output/`.
pub fn manifest_file_name(key: &str, lower_version: &str, higher_version: &str) -> String {
    format!(
        "{}-{}...{}.json",
        path_safe(key),
        path_safe(higher_version),
        path_safe(lower_version)
    )
}

fn path_safe(part: &str) -> String {
    part.replace(['/', '\\'], "_")
}

/// Release tags are `<key>@<version>` in the connector's own repository.
fn release_tag(key: &str, version: &str) -> String {
    format!("{}@{}", key, version)
}

/// Commit messages from the higher environment's tag up to the lower one's.
pub fn fetch_manifest(
    github: &GithubClient<'_>,
    config: &Config,
    key: &str,
    lower_version: &str,
    higher_version: &str,
) -> Result<ChangeManifest, GithubError> {
    let repo = format!("{}{}", config.github.changes_repo_prefix, key);
    let messages = github.compare_messages(
        &config.github.owner,
        &repo,
        &release_tag(key, higher_version),
        &release_tag(key, lower_version),
    )?;
    Ok(ChangeManifest {
        key: key.to_string(),
        from_version: higher_version.to_string(),
        to_version: lower_version.to_string(),
        messages,
    })
}

/// Fetch and persist the change manifest; returns its file name.
///
/// Failures are logged only. The name is returned either way, so a report
/// may link to a file that was never written.
pub fn write_change_manifest(
    github: &GithubClient<'_>,
    config: &Config,
    key: &str,
    lower_version: &str,
    higher_version: &str,
) -> String {
    let file_name = manifest_file_name(key, lower_version, higher_version);
    match fetch_manifest(github, config, key, lower_version, higher_version) {
        Ok(manifest) => {
            let path = output_dir(&config.workdir).join(&file_name);
            match write_json_pretty(&path, &manifest.messages) {
                Ok(()) => tracing::info!(
                    connector = key,
                    commits = manifest.messages.len(),
                    "change manifest written"
                ),
                Err(e) => tracing::error!(connector = key, error = %e, "writing change manifest failed"),
            }
        }
        Err(e) => {
            tracing::error!(connector = key, status = ?e.status(), error = %e, "change manifest fetch failed")
        }
    }
    file_name
}
