use crate::domain::models::{
    AuthReport, ChangeManifest, CleanReport, CompareReport, EnvironmentItem, FetchReport, JsonOut,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// A command result: pretty JSON under `--json`, plain lines otherwise.
pub trait Shown: Serialize {
    fn text(&self) -> String;
}

impl Shown for CompareReport {
    fn text(&self) -> String {
        let mut lines: Vec<String> = self
            .differences
            .iter()
            .map(|r| {
                let d = &r.difference;
                format!("{}\t{}\t{}\t{}", d.key, d.lower.version, d.higher.version, r.changes)
            })
            .collect();
        lines.push(format!(
            "{} differences between {} and {} for {}",
            self.differences.len(),
            self.lower,
            self.higher,
            self.team
        ));
        lines.push(format!("report: {}", self.report_path));
        lines.join("\n")
    }
}

impl Shown for FetchReport {
    fn text(&self) -> String {
        format!("{}\t{} connectors\t{}", self.environment, self.connectors, self.snapshot)
    }
}

/// Team keys, one per line.
impl Shown for BTreeSet<String> {
    fn text(&self) -> String {
        self.iter().cloned().collect::<Vec<_>>().join("\n")
    }
}

impl Shown for ChangeManifest {
    fn text(&self) -> String {
        self.messages.join("\n")
    }
}

impl Shown for AuthReport {
    fn text(&self) -> String {
        format!("authenticated as {}", self.login)
    }
}

impl Shown for Vec<EnvironmentItem> {
    fn text(&self) -> String {
        self.iter()
            .map(|e| format!("{}\t{}", e.name, e.source))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Shown for CleanReport {
    fn text(&self) -> String {
        format!("removed {} paths, {} failed", self.removed.len(), self.failed.len())
    }
}

pub fn render<T: Shown>(json: bool, data: &T) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(&JsonOut { ok: true, data })?)
    } else {
        Ok(data.text())
    }
}

pub fn emit<T: Shown>(json: bool, data: &T) -> anyhow::Result<()> {
    let out = render(json, data)?;
    if !out.is_empty() {
        println!("{}", out);
    }
    Ok(())
}
