use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::models::{AuthReport, CleanReport, EnvironmentItem};
use crate::registry::build_client;
use crate::services::github::GithubClient;
use crate::services::output::emit;
use crate::services::storage::{generated_paths, remove_path};
use anyhow::Context;

pub fn handle_admin_commands(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Auth => {
            let http = build_client(config.http_timeout)?;
            let github = GithubClient::new(&http, config);
            let login = github
                .authenticated_login()
                .context("hosting API authentication failed")?;
            emit(cli.json, &AuthReport { login })?;
        }
        Commands::Envs => {
            let items: Vec<EnvironmentItem> = config
                .environments
                .iter()
                .map(|(name, e)| EnvironmentItem {
                    name: name.clone(),
                    source: e.url.clone().unwrap_or_else(|| "snapshot".to_string()),
                })
                .collect();
            emit(cli.json, &items)?;
        }
        Commands::Clean => {
            let fetchable: Vec<&str> = config
                .environments
                .iter()
                .filter(|(_, e)| e.url.is_some())
                .map(|(name, _)| name.as_str())
                .collect();
            let mut report = CleanReport {
                removed: vec![],
                failed: vec![],
            };
            for path in generated_paths(&config.workdir, &fetchable) {
                let shown = path.to_string_lossy().to_string();
                match remove_path(&path) {
                    Ok(true) => report.removed.push(shown),
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!(path = %shown, error = %e, "cleanup failed");
                        report.failed.push(shown);
                    }
                }
            }
            emit(cli.json, &report)?;
        }
        _ => unreachable!("runtime command routed to admin handler"),
    }
    Ok(())
}
