//! Validation pipeline orchestration.
//!
//! Stages run in a fixed order, each gated on the previous:
//!   1. load gate (any unparseable document aborts)
//!   2. extraction and content-identifier enrichment
//!   3. property-shape validation
//!   4. shape-expression validation
//!   5. link integrity
//!   6. reachability
//!
//! A fatal stage fails the whole run with its formatted report lines. In
//! dev mode, orphan findings demote to warnings carried on the successful
//! outcome instead of failing the run.

use thiserror::Error;
use tracing::{debug, warn};

use vaultweave_core::enrich::{enrich_nodes, EnrichedNode};
use vaultweave_core::node::{extract_all, LoadError, SourceDocument};

use crate::expr::{self, ExprSchema};
use crate::links::{validate_link_integrity, LinkError};
use crate::policy::{severity, Mode, Severity};
use crate::property::{self, CompiledShapes};
use crate::reach::{validate_reachability, ReachError};
use crate::report::ShapeReport;

/// The parsed documents of a vault plus any loader failures.
#[derive(Debug, Clone, Default)]
pub struct VaultInput {
    pub documents: Vec<SourceDocument>,
    pub load_errors: Vec<LoadError>,
}

/// The pipeline stage a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    PropertyShapes,
    ShapeExpressions,
    LinkIntegrity,
    Reachability,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::PropertyShapes => "property shape",
            Stage::ShapeExpressions => "shape expression",
            Stage::LinkIntegrity => "link integrity",
            Stage::Reachability => "reachability",
        };
        write!(f, "{name}")
    }
}

/// A fatal pipeline failure with its printable report lines.
#[derive(Debug, Clone, Error)]
#[error("{stage} validation failed")]
pub struct PipelineFailure {
    pub stage: Stage,
    pub lines: Vec<String>,
}

/// The result of a successful validation run.
///
/// `reach_findings` holds findings demoted to warnings under the active
/// mode; `warnings` is their formatted rendering.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub property_report: ShapeReport,
    pub expr_report: ShapeReport,
    pub reach_findings: Vec<ReachError>,
    pub warnings: Vec<String>,
    pub enriched: Vec<EnrichedNode>,
}

fn link_lines(errors: &[LinkError], mode: Mode) -> Vec<String> {
    let mut lines = vec![format!("Link integrity validation failed (mode: {mode}):")];
    for error in errors {
        lines.push(format!("  - {}: {}", error.file, error.message));
        if let Some(detail) = &error.detail {
            lines.push(format!("    referenced from {detail}"));
        }
    }
    lines
}

fn reach_lines(header: String, errors: &[ReachError]) -> Vec<String> {
    let mut lines = vec![header];
    for error in errors {
        lines.push(format!("  - {}: {}", error.file, error.message));
    }
    lines
}

/// Run the full validation pipeline over a vault.
pub fn validate_vault(
    input: &VaultInput,
    shapes: &CompiledShapes,
    schema: &ExprSchema,
    mode: Mode,
) -> Result<ValidationOutcome, PipelineFailure> {
    if !input.load_errors.is_empty() {
        let mut lines = vec!["Vault load failed:".to_string()];
        for error in &input.load_errors {
            lines.push(format!("  - {}: {}", error.file, error.message));
        }
        return Err(PipelineFailure {
            stage: Stage::Load,
            lines,
        });
    }

    let nodes = extract_all(&input.documents);
    let enriched = enrich_nodes(&nodes);
    debug!(nodes = nodes.len(), %mode, "vault extracted and enriched");

    let property_report = property::validate(&nodes, shapes);
    if !property_report.ok {
        return Err(PipelineFailure {
            stage: Stage::PropertyShapes,
            lines: property_report.format_lines("Property shape validation failed"),
        });
    }
    debug!("property shapes passed");

    let expr_report = expr::validate(&nodes, schema);
    if !expr_report.ok {
        return Err(PipelineFailure {
            stage: Stage::ShapeExpressions,
            lines: expr_report.format_lines("Shape expression validation failed"),
        });
    }
    debug!("shape expressions passed");

    let link_errors = validate_link_integrity(&nodes);
    if !link_errors.is_empty() {
        return Err(PipelineFailure {
            stage: Stage::LinkIntegrity,
            lines: link_lines(&link_errors, mode),
        });
    }
    debug!("link integrity passed");

    let reach_errors = validate_reachability(&enriched);
    let mut warnings = Vec::new();
    let mut reach_findings = Vec::new();
    if !reach_errors.is_empty() {
        let all_demoted = reach_errors
            .iter()
            .all(|e| severity(e.kind.issue_class(), mode) == Severity::Warning);
        if all_demoted {
            let mut lines =
                reach_lines(format!("Reachability warning (mode: {mode}):"), &reach_errors);
            lines.push("Hint: link it from an index page.".to_string());
            for line in &lines {
                warn!("{line}");
            }
            warnings = lines;
            reach_findings = reach_errors;
        } else {
            return Err(PipelineFailure {
                stage: Stage::Reachability,
                lines: reach_lines(
                    format!("Reachability validation failed (mode: {mode}):"),
                    &reach_errors,
                ),
            });
        }
    }
    debug!(warnings = warnings.len(), "reachability passed");

    Ok(ValidationOutcome {
        property_report,
        expr_report,
        reach_findings,
        warnings,
        enriched,
    })
}
