use crate::config::Config;
use crate::domain::models::{CompareReport, DifferenceRecord};
use crate::registry::{build_client, environment_records};
use crate::services::changes::write_change_manifest;
use crate::services::diff::diff_environments;
use crate::services::github::GithubClient;
use crate::services::policy::policy_for;
use crate::services::report::render_table;
use crate::services::storage::{report_path, write_text};
use crate::services::team::fetch_team_mapping;
use anyhow::Context;

/// Run the whole comparison for the pair and team in `config`.
///
/// team mapping -> both environments -> diff -> change manifests -> report.
pub fn run_compare(config: &Config) -> anyhow::Result<CompareReport> {
    config.environment(&config.lower)?;
    config.environment(&config.higher)?;

    let http = build_client(config.http_timeout)?;
    let github = GithubClient::new(&http, config);

    let team = fetch_team_mapping(&github, config, &config.team)
        .with_context(|| format!("loading connectors owned by {}", config.team))?;

    let lower = environment_records(&http, config, &config.lower, &team)
        .with_context(|| format!("loading {} connectors", config.lower))?;
    let higher = environment_records(&http, config, &config.higher, &team)
        .with_context(|| format!("loading {} connectors", config.higher))?;

    let policy = policy_for(&config.policies, &config.lower, &config.higher);
    let differences = diff_environments(
        &config.lower,
        &lower,
        &config.higher,
        &higher,
        &policy,
        config.duplicates,
    )?;
    tracing::info!(
        lower = %config.lower,
        higher = %config.higher,
        compared = lower.len(),
        differences = differences.len(),
        "environments compared"
    );

    let records: Vec<DifferenceRecord> = differences
        .into_iter()
        .map(|d| {
            let changes = write_change_manifest(
                &github,
                config,
                &d.key,
                &d.lower.version,
                &d.higher.version,
            );
            DifferenceRecord {
                difference: d,
                changes,
            }
        })
        .collect();

    let html = render_table(&config.lower, &config.higher, &policy, &records);
    let path = report_path(&config.workdir, &config.lower, &config.higher);
    write_text(&path, &html)?;
    tracing::info!(path = %path.display(), "report written");

    Ok(CompareReport {
        lower: config.lower.clone(),
        higher: config.higher.clone(),
        team: config.team.clone(),
        team_keys: team.keys.len(),
        tracked_fields: policy.field_names(),
        report_path: path.to_string_lossy().to_string(),
        differences: records,
    })
}
