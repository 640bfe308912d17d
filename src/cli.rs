use crate::config::Overrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "connector-diff",
    version,
    about = "Compare connector registries across environments"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, global = true, help = "Config file (TOML)")]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Directory for snapshots, team mapping and output/"
    )]
    pub workdir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Diff two environments for one team and write the HTML report
    Compare {
        #[arg(long)]
        lower: Option<String>,
        #[arg(long)]
        higher: Option<String>,
        #[arg(long)]
        team: Option<String>,
    },
    /// Download one environment's registry snapshot
    Fetch { environment: String },
    /// Show the connector keys owned by a team
    Team {
        #[arg(long)]
        team: Option<String>,
    },
    /// Fetch the commit messages between two versions of a connector
    Changes {
        key: String,
        lower_version: String,
        higher_version: String,
    },
    /// Check hosting API access with the configured token
    Auth,
    /// List configured environments
    Envs,
    /// Remove generated snapshots and output
    Clean,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        let mut o = Overrides {
            config: self.config.clone(),
            workdir: self.workdir.clone(),
            ..Overrides::default()
        };
        match &self.command {
            Commands::Compare {
                lower,
                higher,
                team,
            } => {
                o.lower = lower.clone();
                o.higher = higher.clone();
                o.team = team.clone();
            }
            Commands::Team { team } => o.team = team.clone(),
            _ => {}
        }
        o
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_flags_become_overrides() {
        let cli = Cli::parse_from([
            "connector-diff",
            "--workdir",
            "/tmp/w",
            "compare",
            "--lower",
            "as",
            "--team",
            "core",
        ]);
        let o = cli.overrides();
        assert_eq!(o.lower.as_deref(), Some("as"));
        assert_eq!(o.higher, None);
        assert_eq!(o.team.as_deref(), Some("core"));
        assert_eq!(o.workdir, Some(PathBuf::from("/tmp/w")));
    }
}
