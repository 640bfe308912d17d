use crate::services::diff::DuplicateRule;
use crate::services::policy::PolicyRule;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "connector-diff.toml";
pub const CONFIG_ENV: &str = "CONNECTOR_DIFF_CONFIG";

const DEFAULT_TEAM: &str = "#is-hydra-team";
const DEFAULT_LOWER: &str = "alpha";
const DEFAULT_HIGHER: &str = "prod";

const DEFAULT_ENVIRONMENTS: &[(&str, Option<&str>)] = &[
    (
        "alpha",
        Some("https://api.es-uswest-alpha-0.aws-uswa.cloudelements.app/v3/element/elements"),
    ),
    (
        "staging",
        Some("https://api.es-euwest-stage-0.aws-euws.cloudelements.app/v3/element/elements"),
    ),
    (
        "prod",
        Some("https://api.es-eunorth-prod-0.aws-eunp.cloudelements.app/v3/element/elements"),
    ),
    ("as", None),
];

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),
    #[error("environment {0} has no registry endpoint (pre-seeded snapshot only)")]
    NotFetchable(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub team: String,
    pub lower: String,
    pub higher: String,
    pub workdir: PathBuf,
    pub duplicates: DuplicateRule,
    pub environments: BTreeMap<String, EnvironmentConfig>,
    pub github: GithubConfig,
    /// `None` leaves requests without a deadline.
    pub http_timeout: Option<Duration>,
    /// Configured rules; consulted before the built-in ones.
    pub policies: Vec<PolicyRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// Registry endpoint. Environments without one are pre-seeded snapshots.
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub owner: String,
    pub token_env: String,
    pub changes_repo_prefix: String,
    pub mapping_repo: String,
    pub mapping_path: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            owner: "cloud-elements".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            changes_repo_prefix: "periodic-".to_string(),
            mapping_repo: "spartacus2.0".to_string(),
            mapping_path: "circleci/teamWiseConnectors.json".to_string(),
        }
    }
}

/// Values given on the command line; these win over file and env.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    pub team: Option<String>,
    pub lower: Option<String>,
    pub higher: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub(crate) team: Option<String>,
    pub(crate) lower: Option<String>,
    pub(crate) higher: Option<String>,
    pub(crate) workdir: Option<String>,
    pub(crate) duplicates: Option<DuplicateRule>,
    #[serde(default)]
    pub(crate) environments: BTreeMap<String, FileEnvironment>,
    pub(crate) github: Option<FileGithub>,
    pub(crate) http: Option<FileHttp>,
    #[serde(default)]
    pub(crate) policies: Vec<PolicyRule>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileEnvironment {
    pub(crate) url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileGithub {
    pub(crate) api_base: Option<String>,
    pub(crate) owner: Option<String>,
    pub(crate) token_env: Option<String>,
    pub(crate) changes_repo_prefix: Option<String>,
    pub(crate) mapping_repo: Option<String>,
    pub(crate) mapping_path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileHttp {
    pub(crate) timeout_secs: Option<u64>,
}

impl Config {
    /// Load config: built-in defaults, then the TOML file, then
    /// `CONNECTOR_DIFF_*` env vars, then CLI overrides.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let env = |name: &str| std::env::var(name).ok();
        let path = config_file_path(overrides, &env);
        let file = match path {
            Some(p) => load_file_config(&p)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(file, &env, overrides))
    }

    pub(crate) fn resolve(
        file: FileConfig,
        env: &dyn Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Self {
        let pick = |cli: &Option<String>, var: &str, from_file: Option<String>, default: &str| {
            cli.clone()
                .or_else(|| env(var))
                .or(from_file)
                .unwrap_or_else(|| default.to_string())
        };

        let team = pick(&overrides.team, "CONNECTOR_DIFF_TEAM", file.team, DEFAULT_TEAM);
        let lower = pick(&overrides.lower, "CONNECTOR_DIFF_LOWER", file.lower, DEFAULT_LOWER);
        let higher = pick(
            &overrides.higher,
            "CONNECTOR_DIFF_HIGHER",
            file.higher,
            DEFAULT_HIGHER,
        );

        let workdir = overrides
            .workdir
            .clone()
            .or_else(|| env("CONNECTOR_DIFF_WORKDIR").map(PathBuf::from))
            .or_else(|| file.workdir.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let mut environments: BTreeMap<String, EnvironmentConfig> = DEFAULT_ENVIRONMENTS
            .iter()
            .map(|(name, url)| {
                (
                    name.to_string(),
                    EnvironmentConfig {
                        url: url.map(str::to_string),
                    },
                )
            })
            .collect();
        for (name, e) in file.environments {
            environments.insert(name, EnvironmentConfig { url: e.url });
        }

        let mut github = GithubConfig::default();
        if let Some(g) = file.github {
            if let Some(v) = g.api_base {
                github.api_base = v;
            }
            if let Some(v) = g.owner {
                github.owner = v;
            }
            if let Some(v) = g.token_env {
                github.token_env = v;
            }
            if let Some(v) = g.changes_repo_prefix {
                github.changes_repo_prefix = v;
            }
            if let Some(v) = g.mapping_repo {
                github.mapping_repo = v;
            }
            if let Some(v) = g.mapping_path {
                github.mapping_path = v;
            }
        }
        if let Some(api) = env("CONNECTOR_DIFF_GITHUB_API") {
            github.api_base = api;
        }
        github.api_base = github.api_base.trim_end_matches('/').to_string();

        Config {
            team,
            lower,
            higher,
            workdir,
            duplicates: file.duplicates.unwrap_or_default(),
            environments,
            github,
            http_timeout: file
                .http
                .and_then(|h| h.timeout_secs)
                .map(Duration::from_secs),
            policies: file.policies,
        }
    }

    pub fn environment(&self, name: &str) -> Result<&EnvironmentConfig, ConfigError> {
        self.environments
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEnvironment(name.to_string()))
    }

    /// Registry endpoint of an environment that can be fetched.
    pub fn registry_url(&self, name: &str) -> Result<&str, ConfigError> {
        self.environment(name)?
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::NotFetchable(name.to_string()))
    }

    pub fn token(&self) -> Option<String> {
        std::env::var(&self.github.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

fn config_file_path(
    overrides: &Overrides,
    env: &dyn Fn(&str) -> Option<String>,
) -> Option<PathBuf> {
    if let Some(p) = &overrides.config {
        return Some(p.clone());
    }
    if let Some(p) = env(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
