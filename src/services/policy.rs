use crate::domain::models::ConnectorRecord;
use serde::{Deserialize, Serialize};

/// Pre-seeded environment whose catalog does not carry a reliable
/// `hasHttpRequest` flag.
pub const VERSION_ONLY_ENVIRONMENT: &str = "as";

const WILDCARD: &str = "*";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedField {
    #[serde(rename = "latestVersion")]
    LatestVersion,
    #[serde(rename = "hasHttpRequest")]
    HasHttpRequest,
}

impl TrackedField {
    pub fn name(self) -> &'static str {
        match self {
            TrackedField::LatestVersion => "latestVersion",
            TrackedField::HasHttpRequest => "hasHttpRequest",
        }
    }

    fn differs(self, lower: &ConnectorRecord, higher: &ConnectorRecord) -> bool {
        match self {
            TrackedField::LatestVersion => lower.latest_version != higher.latest_version,
            TrackedField::HasHttpRequest => lower.has_http_request != higher.has_http_request,
        }
    }
}

/// A configured comparison rule. `lower`/`higher` accept `*`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PolicyRule {
    #[serde(default = "wildcard")]
    pub lower: String,
    #[serde(default = "wildcard")]
    pub higher: String,
    pub fields: Vec<TrackedField>,
}

fn wildcard() -> String {
    WILDCARD.to_string()
}

impl PolicyRule {
    fn matches(&self, lower: &str, higher: &str) -> bool {
        env_matches(&self.lower, lower) && env_matches(&self.higher, higher)
    }

    fn specificity(&self) -> u8 {
        u8::from(self.lower != WILDCARD) + u8::from(self.higher != WILDCARD)
    }
}

fn env_matches(pattern: &str, env: &str) -> bool {
    pattern == WILDCARD || pattern == env
}

/// Which fields decide that a connector changed between two environments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparePolicy {
    pub fields: Vec<TrackedField>,
}

impl ComparePolicy {
    pub fn all_fields() -> Self {
        Self {
            fields: vec![TrackedField::LatestVersion, TrackedField::HasHttpRequest],
        }
    }

    pub fn version_only() -> Self {
        Self {
            fields: vec![TrackedField::LatestVersion],
        }
    }

    pub fn tracks(&self, field: TrackedField) -> bool {
        self.fields.contains(&field)
    }

    pub fn differs(&self, lower: &ConnectorRecord, higher: &ConnectorRecord) -> bool {
        self.fields.iter().any(|f| f.differs(lower, higher))
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name().to_string()).collect()
    }
}

fn builtin_rules() -> Vec<PolicyRule> {
    vec![PolicyRule {
        lower: VERSION_ONLY_ENVIRONMENT.to_string(),
        higher: wildcard(),
        fields: vec![TrackedField::LatestVersion],
    }]
}

/// Resolve the policy for an environment pair.
///
/// Configured rules win over built-in ones; within a group the most
/// specific match wins, then the first declared.
pub fn policy_for(configured: &[PolicyRule], lower: &str, higher: &str) -> ComparePolicy {
    for rules in [configured.to_vec(), builtin_rules()] {
        let best = rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches(lower, higher))
            .max_by(|(ia, a), (ib, b)| a.specificity().cmp(&b.specificity()).then(ib.cmp(ia)));
        if let Some((_, rule)) = best {
            return ComparePolicy {
                fields: rule.fields.clone(),
            };
        }
    }
    ComparePolicy::all_fields()
}
