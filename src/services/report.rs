use crate::domain::models::{DifferenceRecord, SideState};
use crate::services::policy::{ComparePolicy, TrackedField};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write as _;

/// Bytes that cannot appear raw in a relative href path segment.
const HREF_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn headers(lower: &str, higher: &str, policy: &ComparePolicy) -> Vec<String> {
    let with_flag = policy.tracks(TrackedField::HasHttpRequest);
    let mut h = vec!["key".to_string()];
    for env in [lower, higher] {
        h.push(format!("{}-version", env));
        if with_flag {
            h.push(format!("{}-hasHttpRequest", env));
        }
    }
    h.push("changes".to_string());
    h
}

fn side_cells(side: &SideState, cells: &mut Vec<String>) {
    cells.push(escape_html(&side.version));
    if let Some(flag) = side.has_http_request {
        cells.push(flag.to_string());
    }
}

fn link(file_name: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        utf8_percent_encode(file_name, HREF_SEGMENT),
        escape_html(file_name)
    )
}

/// One table, one row per difference, rows in the given order.
pub fn render_table(
    lower: &str,
    higher: &str,
    policy: &ComparePolicy,
    records: &[DifferenceRecord],
) -> String {
    let mut html = String::new();
    html.push_str("<table border=\"1\" class=\"connector-diff\">\n");
    html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
    for h in headers(lower, higher, policy) {
        let _ = writeln!(html, "      <th>{}</th>", escape_html(&h));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for r in records {
        let mut cells = vec![escape_html(&r.difference.key)];
        side_cells(&r.difference.lower, &mut cells);
        side_cells(&r.difference.higher, &mut cells);
        cells.push(link(&r.changes));

        html.push_str("    <tr>\n");
        for c in cells {
            let _ = writeln!(html, "      <td>{}</td>", c);
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Difference;

    fn record(key: &str, lower: &str, higher: &str, flags: Option<(bool, bool)>) -> DifferenceRecord {
        DifferenceRecord {
            difference: Difference {
                key: key.to_string(),
                lower: SideState {
                    version: lower.to_string(),
                    has_http_request: flags.map(|f| f.0),
                },
                higher: SideState {
                    version: higher.to_string(),
                    has_http_request: flags.map(|f| f.1),
                },
            },
            changes: format!("{}-{}...{}.json", key, higher, lower),
        }
    }

    #[test]
    fn empty_diff_renders_header_only() {
        let html = render_table("alpha", "prod", &ComparePolicy::all_fields(), &[]);
        assert!(html.contains("<th>alpha-hasHttpRequest</th>"));
        assert!(html.contains("<tbody>\n  </tbody>"));
        assert_eq!(html.matches("<td>").count(), 0);
    }

    #[test]
    fn rows_keep_order_and_link_manifests() {
        let records = vec![
            record("zeta", "1.1", "1.0", Some((true, false))),
            record("alpha", "2", "1", Some((false, false))),
        ];
        let html = render_table("alpha", "prod", &ComparePolicy::all_fields(), &records);
        assert_eq!(html.matches("<tr>").count(), 2);
        assert!(html.find("zeta").unwrap() < html.find("<td>alpha</td>").unwrap());
        assert!(html.contains("<a href=\"zeta-1.0...1.1.json\">zeta-1.0...1.1.json</a>"));
        assert!(html.contains("<td>true</td>"));
    }

    #[test]
    fn version_only_policy_drops_capability_columns() {
        let records = vec![record("box", "3", "2", None)];
        let html = render_table("as", "prod", &ComparePolicy::version_only(), &records);
        assert!(!html.contains("hasHttpRequest"));
        assert!(html.contains("<th>as-version</th>"));
        assert_eq!(html.matches("<td>").count(), 4);
    }

    #[test]
    fn cell_text_is_escaped() {
        let records = vec![record("<b>", "1&2", "1", None)];
        let html = render_table("as", "prod", &ComparePolicy::version_only(), &records);
        assert!(html.contains("<td>&lt;b&gt;</td>"));
        assert!(html.contains("<td>1&amp;2</td>"));
    }

    #[test]
    fn link_href_is_percent_encoded() {
        let html = link("a b#1?.json");
        assert_eq!(html, "<a href=\"a%20b%231%3F.json\">a b#1?.json</a>");
        assert_eq!(
            link("x&y.json"),
            "<a href=\"x%26y.json\">x&amp;y.json</a>"
        );
    }
}
