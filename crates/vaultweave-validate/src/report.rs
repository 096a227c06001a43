//! Shared violation and report types for the shape engines.

use serde::Serialize;
use serde_json::Value;

/// One constraint failure, with enough context to navigate straight to the
/// offending document.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub node_id: String,
    pub shape_id: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Aggregated engine result: `ok` iff zero violations.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeReport {
    pub ok: bool,
    pub violations: Vec<Violation>,
}

impl ShapeReport {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        ShapeReport {
            ok: violations.is_empty(),
            violations,
        }
    }

    /// Render the report as printable lines, one per violation.
    /// An ok report renders to nothing.
    pub fn format_lines(&self, header: &str) -> Vec<String> {
        if self.ok {
            return Vec::new();
        }
        let mut lines = vec![format!("{header}:")];
        for v in &self.violations {
            let source = v
                .source
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default();
            lines.push(format!("  - {} {}: {}{}", v.node_id, v.path, v.message, source));
        }
        lines
    }
}
