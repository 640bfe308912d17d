use crate::domain::models::{ConnectorRecord, Difference, SideState};
use crate::services::policy::{ComparePolicy, TrackedField};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do when a key shows up more than once in one snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateRule {
    #[default]
    Reject,
    FirstMatch,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DiffError {
    #[error("duplicate connector key {key} in {environment} snapshot")]
    DuplicateKey { environment: String, key: String },
}

/// Index records by key, applying the duplicate rule.
///
/// Returns the keys in first-seen order alongside the index.
fn index_by_key<'a>(
    environment: &str,
    records: &'a [ConnectorRecord],
    rule: DuplicateRule,
) -> Result<(Vec<&'a str>, HashMap<&'a str, &'a ConnectorRecord>), DiffError> {
    let mut order = Vec::with_capacity(records.len());
    let mut index = HashMap::with_capacity(records.len());
    for r in records {
        if index.contains_key(r.key.as_str()) {
            match rule {
                DuplicateRule::Reject => {
                    return Err(DiffError::DuplicateKey {
                        environment: environment.to_string(),
                        key: r.key.clone(),
                    })
                }
                DuplicateRule::FirstMatch => {
                    tracing::warn!(env = environment, connector = %r.key, "duplicate key, keeping first");
                    continue;
                }
            }
        }
        order.push(r.key.as_str());
        index.insert(r.key.as_str(), r);
    }
    Ok((order, index))
}

fn side(record: &ConnectorRecord, policy: &ComparePolicy) -> SideState {
    SideState {
        version: record.latest_version.clone(),
        has_http_request: policy
            .tracks(TrackedField::HasHttpRequest)
            .then_some(record.has_http_request),
    }
}

/// Match both lists by key and report every connector whose tracked fields
/// differ. Keys missing on either side are not reported. Output follows the
/// order of `lower`.
pub fn diff_environments(
    lower_env: &str,
    lower: &[ConnectorRecord],
    higher_env: &str,
    higher: &[ConnectorRecord],
    policy: &ComparePolicy,
    rule: DuplicateRule,
) -> Result<Vec<Difference>, DiffError> {
    let (lower_keys, lower_index) = index_by_key(lower_env, lower, rule)?;
    let (_, higher_index) = index_by_key(higher_env, higher, rule)?;

    let mut out = Vec::new();
    for key in lower_keys {
        let l = lower_index[key];
        let Some(h) = higher_index.get(key) else {
            continue;
        };
        if policy.differs(l, h) {
            out.push(Difference {
                key: key.to_string(),
                lower: side(l, policy),
                higher: side(h, policy),
            });
        }
    }
    Ok(out)
}
