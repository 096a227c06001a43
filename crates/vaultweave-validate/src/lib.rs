//! vaultweave-validate
//!
//! Constraint validation for Vaultweave vaults:
//! - Property-shape engine (cardinality/datatype/pattern/enumeration/class
//!   constraints keyed by target type)
//! - Shape-expression engine (nested typed shape expressions with triple
//!   constraints and recursive shape references)
//! - Link integrity (duplicate identifiers, unresolved internal links,
//!   reference-node placement)
//! - Reachability (root-set computation, BFS over same-origin references,
//!   orphan detection with draft/private exemptions)
//! - Severity policy and the validation orchestrator
//!
//! The two shape engines run independently: their closed-shape and class
//! semantics differ, and both must pass. They share only the node model
//! from vaultweave-core.

pub mod expr;
pub mod links;
pub mod pipeline;
pub mod policy;
pub mod property;
pub mod reach;
pub mod report;

/// Convenience re-exports.
pub mod prelude {
    pub use crate::expr::ExprSchema;
    pub use crate::links::{validate_link_integrity, LinkError, LinkErrorKind};
    pub use crate::pipeline::{
        validate_vault, PipelineFailure, Stage, ValidationOutcome, VaultInput,
    };
    pub use crate::policy::{severity, IssueClass, Mode, Severity};
    pub use crate::property::{CompiledShapes, ShapesDocument};
    pub use crate::reach::{validate_reachability, ReachError, ReachErrorKind};
    pub use crate::report::{ShapeReport, Violation};
}
