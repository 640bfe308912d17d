#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;
use tiny_http::{Header, Response, Server, StatusCode};

pub const TEAM: &str = "#is-hydra-team";
pub const TOKEN: &str = "test-token";

#[derive(Clone, Debug)]
pub struct Seen {
    pub url: String,
    pub authorization: Option<String>,
}

/// Canned HTTP endpoints standing in for the registries and the hosting API.
pub struct MockApi {
    pub base: String,
    pub seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockApi {
    pub fn serve(routes: HashMap<String, (u16, String)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let base = format!("http://{}", server.server_addr());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for req in server.incoming_requests() {
                let url = req.url().to_string();
                let authorization = req
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());
                log.lock().expect("request log").push(Seen {
                    url: url.clone(),
                    authorization,
                });
                let (status, body) = routes
                    .get(&url)
                    .cloned()
                    .unwrap_or((404, r#"{"message":"Not Found"}"#.to_string()));
                let resp = Response::from_string(body)
                    .with_status_code(StatusCode(status))
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json")
                            .expect("content type header"),
                    );
                let _ = req.respond(resp);
            }
        });
        Self { base, seen }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().expect("request log").clone()
    }
}

/// Routes for a run, keyed by request path.
#[derive(Default)]
pub struct Routes(pub HashMap<String, (u16, String)>);

impl Routes {
    pub fn registry(mut self, env: &str, records: &[(&str, &str, bool)]) -> Self {
        self.0
            .insert(format!("/registry/{}", env), (200, catalog(records)));
        self
    }

    pub fn team_mapping(mut self, document: Value) -> Self {
        self.0.insert(
            "/gh/repos/acme/teams/contents/teams.json".to_string(),
            (200, contents_body(&document)),
        );
        self
    }

    pub fn compare(mut self, key: &str, base: &str, head: &str, messages: &[&str]) -> Self {
        self.0.insert(
            format!(
                "/gh/repos/acme/periodic-{}/compare/{}@{}...{}@{}",
                key, key, base, key, head
            ),
            (200, compare_body(messages)),
        );
        self
    }

    pub fn raw(mut self, path: &str, status: u16, body: &str) -> Self {
        self.0.insert(path.to_string(), (status, body.to_string()));
        self
    }
}

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub workdir: PathBuf,
    pub config: PathBuf,
    pub api: MockApi,
}

impl TestEnv {
    pub fn new(routes: Routes) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let workdir = root.join("work");
        fs::create_dir_all(&workdir).expect("create workdir");

        let api = MockApi::serve(routes.0);
        let config = root.join("connector-diff.toml");
        fs::write(&config, config_toml(&api.base)).expect("write config");

        Self {
            _tmp: tmp,
            root,
            workdir,
            config,
            api,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("connector-diff");
        cmd.current_dir(&self.root)
            .env("GITHUB_TOKEN", TOKEN)
            .env_remove("CONNECTOR_DIFF_CONFIG")
            .env_remove("CONNECTOR_DIFF_TEAM")
            .env_remove("CONNECTOR_DIFF_LOWER")
            .env_remove("CONNECTOR_DIFF_HIGHER")
            .env_remove("CONNECTOR_DIFF_WORKDIR")
            .env_remove("CONNECTOR_DIFF_GITHUB_API")
            .arg("--config")
            .arg(&self.config)
            .arg("--workdir")
            .arg(&self.workdir);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn seed_snapshot(&self, env: &str, records: &[(&str, &str, bool)]) {
        fs::write(
            self.workdir.join(format!("connector-details-{}.json", env)),
            catalog(records),
        )
        .expect("seed snapshot");
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.workdir.join("output").join(name)
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("read generated file")
    }
}

fn config_toml(base: &str) -> String {
    format!(
        r#"
lower = "alpha"
higher = "prod"

[environments.alpha]
url = "{base}/registry/alpha"

[environments.prod]
url = "{base}/registry/prod"

[environments.staging]
url = "{base}/registry/staging"

[github]
api_base = "{base}/gh"
owner = "acme"
mapping_repo = "teams"
mapping_path = "teams.json"
"#
    )
}

pub fn catalog(records: &[(&str, &str, bool)]) -> String {
    let items: Vec<Value> = records
        .iter()
        .enumerate()
        .map(|(i, (key, version, http))| {
            json!({
                "id": i,
                "key": key,
                "name": key.to_uppercase(),
                "latestVersion": version,
                "hasHttpRequest": http,
                "active": true
            })
        })
        .collect();
    Value::Array(items).to_string()
}

/// Contents API body: base64 wrapped at 60 columns like the real service.
pub fn contents_body(document: &Value) -> String {
    let encoded = STANDARD.encode(document.to_string());
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).to_string())
        .collect();
    json!({
        "name": "teams.json",
        "encoding": "base64",
        "content": format!("{}\n", wrapped.join("\n"))
    })
    .to_string()
}

pub fn compare_body(messages: &[&str]) -> String {
    let commits: Vec<Value> = messages
        .iter()
        .map(|m| json!({"sha": "0000", "commit": {"message": m, "author": {"name": "dev"}}}))
        .collect();
    json!({"status": "ahead", "total_commits": commits.len(), "commits": commits}).to_string()
}

pub fn team_document(keys: &[&str]) -> Value {
    json!({
        TEAM: keys,
        "#other-team": ["foreign"]
    })
}
