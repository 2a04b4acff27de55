//! Status badges shown next to documents.

use serde::Serialize;

use etmf_entity::document::DocumentStatus;

/// Label and color for one document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    /// Display label.
    pub label: &'static str,
    /// CSS color.
    pub color: &'static str,
}

const BADGES: &[(&str, StatusBadge)] = &[
    ("draft", StatusBadge { label: "Draft", color: "#6b7280" }),
    ("on_review", StatusBadge { label: "On Review", color: "#f59e0b" }),
    ("approved", StatusBadge { label: "Approved", color: "#10b981" }),
    ("rejected", StatusBadge { label: "Rejected", color: "#ef4444" }),
    ("archived", StatusBadge { label: "Archived", color: "#3b82f6" }),
];

impl StatusBadge {
    /// Badge for any status string that is not recognised.
    pub const UNKNOWN: StatusBadge = StatusBadge {
        label: "UNKNOWN",
        color: "#9ca3af",
    };

    /// Badge for the wire name `status`. Matching is exact.
    pub fn resolve(status: &str) -> Self {
        BADGES
            .iter()
            .find(|(name, _)| *name == status)
            .map_or(Self::UNKNOWN, |(_, badge)| *badge)
    }

    /// Badge for a typed status.
    pub fn for_status(status: DocumentStatus) -> Self {
        Self::resolve(status.as_str())
    }

    /// Whether this is the fallback badge.
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// `<span>` markup for the badge, with the label escaped.
    pub fn render_html(&self) -> String {
        format!(
            r#"<span class="status-badge" style="background-color:{}">{}</span>"#,
            self.color,
            escape_html(self.label)
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
