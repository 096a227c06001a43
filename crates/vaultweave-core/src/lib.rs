//! vaultweave-core
//!
//! Core primitives for Vaultweave:
//! - Vault node model (open JSON-LD-style records with provenance)
//! - Node extraction from parsed documents
//! - Deterministic canonicalization + SHA-256 hashing
//! - Content-identifier enrichment (stable CIDs for deduplication)
//! - Shared reference tree-walk used by link and reachability validators
//! - IRI origin/fragment/slug helpers
//!
//! The core crate does no filesystem or network I/O. Callers load and parse
//! vault documents themselves and hand already-parsed values in.

pub mod canonical;
pub mod enrich;
pub mod errors;
pub mod iri;
pub mod node;
pub mod walk;

pub use crate::errors::{VaultError, VaultResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::canonical::{canonical_form, canonicalize, content_id, Canonicalized};
    pub use crate::enrich::{enrich_node, enrich_nodes, EnrichedNode};
    pub use crate::node::{extract_all, extract_nodes, LoadError, Node, SourceDocument, SourceRef};
    pub use crate::walk::{collect_refs, FoundRef, RefKind};
    pub use crate::{VaultError, VaultResult};
}
