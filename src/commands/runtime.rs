use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::models::FetchReport;
use crate::registry::{build_client, load_snapshot, refresh_snapshot};
use crate::services::changes::{fetch_manifest, manifest_file_name};
use crate::services::compare::run_compare;
use crate::services::github::GithubClient;
use crate::services::output::emit;
use crate::services::storage::{output_dir, write_json_pretty};
use crate::services::team::fetch_team_mapping;

pub fn handle_runtime_commands(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Compare { .. } => {
            let report = run_compare(config)?;
            emit(cli.json, &report)?;
        }
        Commands::Fetch { environment } => {
            let http = build_client(config.http_timeout)?;
            let path = refresh_snapshot(&http, config, environment)?;
            let entries = load_snapshot(&config.workdir, environment)?;
            let report = FetchReport {
                environment: environment.clone(),
                snapshot: path.to_string_lossy().to_string(),
                connectors: entries.len(),
            };
            emit(cli.json, &report)?;
        }
        Commands::Team { .. } => {
            let http = build_client(config.http_timeout)?;
            let github = GithubClient::new(&http, config);
            let mapping = fetch_team_mapping(&github, config, &config.team)?;
            emit(cli.json, &mapping.keys)?;
        }
        Commands::Changes {
            key,
            lower_version,
            higher_version,
        } => {
            let http = build_client(config.http_timeout)?;
            let github = GithubClient::new(&http, config);
            let manifest = fetch_manifest(&github, config, key, lower_version, higher_version)?;
            let path = output_dir(&config.workdir).join(manifest_file_name(
                key,
                lower_version,
                higher_version,
            ));
            write_json_pretty(&path, &manifest.messages)?;
            emit(cli.json, &manifest)?;
        }
        _ => unreachable!("admin command routed to runtime handler"),
    }
    Ok(())
}
