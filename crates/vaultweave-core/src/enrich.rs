//! Content-identifier enrichment.
//!
//! Enrichment attaches the canonical hash and the derived content identifier
//! to a node. Both are pure functions of the node's data; provenance is held
//! outside the data and never affects the identifier. Batch enrichment runs
//! in parallel: nodes are independent and immutable, so there is no shared
//! state and no ordering requirement.

use rayon::prelude::*;
use serde_json::Value;

use crate::canonical::{canonicalize, content_id};
use crate::node::Node;

/// A node plus its canonical hash and content identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedNode {
    pub node: Node,
    pub canonical_hash: String,
    pub cid: String,
}

impl EnrichedNode {
    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn file(&self) -> &str {
        &self.node.source.file
    }
}

/// Enrich one node with its canonical hash and content identifier.
pub fn enrich_node(node: &Node) -> EnrichedNode {
    let canonical = canonicalize(&Value::Object(node.data.clone()));
    let cid = content_id(&canonical.hash);
    EnrichedNode {
        node: node.clone(),
        canonical_hash: canonical.hash,
        cid,
    }
}

/// Enrich a batch of nodes in parallel, preserving input order.
pub fn enrich_nodes(nodes: &[Node]) -> Vec<EnrichedNode> {
    nodes.par_iter().map(enrich_node).collect()
}
