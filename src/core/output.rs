//! Compact rendering of compile diagnostics.
//!
//! Keeps report output bounded and readable while preserving signal.

use crate::core::issues::NodeIssue;
use colored::Colorize;

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Render one issue as a single line: `node (kind): message [cause]`.
pub fn render_issue(issue: &NodeIssue) -> String {
    let mut line = format!(
        "{} {} ({}): {}",
        "ISSUE".red().bold(),
        issue.node,
        issue.kind,
        compact_line(&issue.message, 160)
    );
    if let Some(cause) = &issue.cause {
        line.push_str(&format!(" [{}]", compact_line(cause, 80)));
    }
    line
}

/// Render a full issue list, capped at `max_items` with an overflow marker.
pub fn render_issues(issues: &[NodeIssue], max_items: usize) -> String {
    if issues.is_empty() {
        return format!("{} no issues", "OK".green().bold());
    }
    let mut lines: Vec<String> = issues.iter().take(max_items).map(render_issue).collect();
    if issues.len() > max_items {
        lines.push(format!("(+{} more)", issues.len() - max_items));
    }
    lines.join("\n")
}
