mod common;

use common::{team_document, Routes, TestEnv};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

fn load_schema(name: &str) -> Value {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let raw = fs::read_to_string(root.join("docs/contracts").join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn validate(schema_name: &str, data: &Value) {
    let schema = load_schema(schema_name);
    let validator = JSONSchema::compile(&schema).expect("compile schema");
    let msgs: Vec<String> = match validator.validate(data) {
        Ok(()) => return,
        Err(errors) => errors.map(|e| e.to_string()).collect(),
    };
    panic!("schema validation failed: {}", msgs.join(" | "));
}

#[test]
fn contracts_check() {
    let env = TestEnv::new(
        Routes::default()
            .team_mapping(team_document(&["box", "crm"]))
            .registry("alpha", &[("box", "1.1", true), ("crm", "2", false)])
            .registry("prod", &[("box", "1.0", false), ("crm", "2", false)])
            .compare("box", "1.0", "1.1", &["fix"]),
    );
    env.seed_snapshot("as", &[("box", "1.1", true)]);

    let compare = env.run_json(&["compare"]);
    assert_eq!(compare["ok"], true);
    validate("compare.schema.json", &compare["data"]);

    let version_only = env.run_json(&["compare", "--lower", "as"]);
    assert_eq!(version_only["ok"], true);
    validate("compare.schema.json", &version_only["data"]);

    let envs = env.run_json(&["envs"]);
    assert_eq!(envs["ok"], true);
    validate("envs.schema.json", &envs["data"]);

    let changes = env.run_json(&["changes", "box", "1.1", "1.0"]);
    assert_eq!(changes["ok"], true);
    validate("changes.schema.json", &changes["data"]);
}
