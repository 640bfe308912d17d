use crate::config::Config;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const ACCEPT: &str = "application/vnd.github.v3+json";
const API_VERSION: &str = "2022-11-28";

#[derive(thiserror::Error, Debug)]
pub enum GithubError {
    #[error("GET {url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("GET {url}: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
}

impl GithubError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GithubError::Status { status, .. } => Some(*status),
            GithubError::Transport { .. } => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentsResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    #[serde(default)]
    commits: Vec<CompareCommit>,
}

#[derive(Debug, Deserialize)]
struct CompareCommit {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

/// Authenticated access to the hosting API.
pub struct GithubClient<'a> {
    http: &'a Client,
    api_base: &'a str,
    token: Option<String>,
}

impl<'a> GithubClient<'a> {
    pub fn new(http: &'a Client, config: &'a Config) -> Self {
        let token = config.token();
        if token.is_none() {
            tracing::warn!(
                var = %config.github.token_env,
                "no access token set; hosting API requests are unauthenticated"
            );
        }
        Self {
            http,
            api_base: &config.github.api_base,
            token,
        }
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let req = self
            .http
            .get(url)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(t) => req.header("Authorization", format!("token {}", t)),
            None => req,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GithubError> {
        let url = format!("{}{}", self.api_base, path);
        let transport = |source| GithubError::Transport {
            url: url.clone(),
            source,
        };
        let resp = self.request(&url).send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GithubError::Status {
                url: url.clone(),
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }
        resp.json().map_err(transport)
    }

    /// Raw (base64) content of one repository file.
    pub fn repo_contents(&self, owner: &str, repo: &str, path: &str) -> Result<String, GithubError> {
        let c: ContentsResponse =
            self.get_json(&format!("/repos/{}/{}/contents/{}", owner, repo, path))?;
        Ok(c.content)
    }

    /// Commit messages reachable from `head` but not from `base`, oldest first.
    pub fn compare_messages(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>, GithubError> {
        let c: CompareResponse = self.get_json(&format!(
            "/repos/{}/{}/compare/{}...{}",
            owner, repo, base, head
        ))?;
        Ok(c.commits.into_iter().map(|c| c.commit.message).collect())
    }

    pub fn authenticated_login(&self) -> Result<String, GithubError> {
        let u: User = self.get_json("/user")?;
        Ok(u.login)
    }
}
