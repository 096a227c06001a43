//! Reachability validation over the content graph.
//!
//! Every enriched node must first carry a unique content identifier; a
//! collision aborts immediately. Roots are then collected from catalog and
//! dataset nodes, the graph is traversed breadth-first along same-origin
//! references, and every published node left unvisited is reported as an
//! orphan. Orphans aggregate: one error per unreachable node, so a single
//! run surfaces all of them. Nodes marked draft or private are exempt.
//!
//! Dataset roots that do not resolve to a node directly act as prefixes:
//! a catalog whose dataset entry is `https://e.org/docs/` seeds every node
//! whose identifier starts with that prefix. Catalog identifiers and
//! entrypoints are exact-match roots.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use serde_json::Value;

use vaultweave_core::enrich::EnrichedNode;
use vaultweave_core::iri::{origin, split_fragment};
use vaultweave_core::node::ID_KEY;
use vaultweave_core::walk::collect_refs;

/// Node types whose instances anchor the graph.
pub const ROOT_TYPES: &[&str] = &["Catalog", "VaultIndex"];

/// Node types that are roots in their own right.
pub const DATASET_TYPES: &[&str] = &["Dataset"];

const DATASET_KEY: &str = "dataset";
const ENTRYPOINT_KEY: &str = "entrypoint";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachErrorKind {
    DuplicateCid,
    NoRoots,
    Orphan,
}

/// A single reachability finding.
#[derive(Debug, Clone)]
pub struct ReachError {
    pub kind: ReachErrorKind,
    pub message: String,
    pub file: String,
}

fn linked_id(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get(ID_KEY).and_then(Value::as_str),
        _ => None,
    }
}

/// Root identifiers declared by catalog and dataset nodes.
///
/// Exact roots seed only the node they resolve to. Prefix roots that do
/// not resolve to a node seed everything under their identifier prefix.
#[derive(Debug, Default)]
struct RootSet {
    exact: BTreeSet<String>,
    prefix: BTreeSet<String>,
}

impl RootSet {
    fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefix.is_empty()
    }
}

fn collect_roots(nodes: &[EnrichedNode]) -> RootSet {
    let mut roots = RootSet::default();
    for enriched in nodes {
        let node = &enriched.node;
        if ROOT_TYPES.iter().any(|ty| node.has_type(ty)) {
            roots.exact.insert(node.id.clone());
            // `dataset` and `entrypoint` must be arrays; any other shape
            // is ignored. Dataset entries must be `@id`-bearing objects,
            // entrypoint entries may also be bare strings.
            if let Some(Value::Array(entries)) = node.get(DATASET_KEY) {
                for entry in entries {
                    let id = entry.as_object().and_then(|o| o.get(ID_KEY)).and_then(Value::as_str);
                    if let Some(id) = id {
                        roots.prefix.insert(id.to_string());
                    }
                }
            }
            if let Some(Value::Array(entries)) = node.get(ENTRYPOINT_KEY) {
                for entry in entries {
                    if let Some(id) = linked_id(entry) {
                        roots.exact.insert(id.to_string());
                    }
                }
            }
        }
        if DATASET_TYPES.iter().any(|ty| node.has_type(ty)) {
            roots.prefix.insert(node.id.clone());
        }
    }
    roots
}

/// Validate reachability over the enriched node set.
///
/// Returns an empty vector when every published node is reachable, a single
/// error for a duplicate content identifier or a rootless graph, or one
/// aggregated error per orphan.
pub fn validate_reachability(nodes: &[EnrichedNode]) -> Vec<ReachError> {
    let mut cid_index: BTreeMap<&str, &EnrichedNode> = BTreeMap::new();
    for enriched in nodes {
        if cid_index.insert(enriched.cid.as_str(), enriched).is_some() {
            return vec![ReachError {
                kind: ReachErrorKind::DuplicateCid,
                message: format!("Duplicate content identifier detected: {}", enriched.cid),
                file: enriched.file().to_string(),
            }];
        }
    }

    let mut id_index: BTreeMap<&str, &EnrichedNode> = BTreeMap::new();
    for enriched in nodes {
        id_index.entry(enriched.id()).or_insert(enriched);
    }

    let roots = collect_roots(nodes);
    if roots.is_empty() {
        return vec![ReachError {
            kind: ReachErrorKind::NoRoots,
            message: "Reachability validation failed: no root nodes found".to_string(),
            file: "<unknown>".to_string(),
        }];
    }

    let internal_origins: BTreeSet<String> =
        id_index.keys().filter_map(|id| origin(id)).collect();

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&EnrichedNode> = VecDeque::new();

    for root in &roots.exact {
        if let Some(enriched) = id_index.get(root.as_str()) {
            if visited.insert(enriched.cid.as_str()) {
                queue.push_back(enriched);
            }
        }
    }
    for root in &roots.prefix {
        if let Some(enriched) = id_index.get(root.as_str()) {
            if visited.insert(enriched.cid.as_str()) {
                queue.push_back(enriched);
            }
            continue;
        }
        // A prefix root with no node of its own seeds everything under it.
        for enriched in nodes {
            if enriched.id().starts_with(root.as_str())
                && visited.insert(enriched.cid.as_str())
            {
                queue.push_back(enriched);
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        for found in collect_refs(&current.node) {
            let Some(ref_origin) = origin(&found.id) else {
                continue;
            };
            if !internal_origins.contains(&ref_origin) {
                continue;
            }
            let target = id_index
                .get(found.id.as_str())
                .or_else(|| id_index.get(split_fragment(&found.id)));
            if let Some(enriched) = target {
                if visited.insert(enriched.cid.as_str()) {
                    queue.push_back(enriched);
                }
            }
        }
    }

    let mut errors = Vec::new();
    for enriched in nodes {
        if visited.contains(enriched.cid.as_str()) || enriched.node.is_draft_or_private() {
            continue;
        }
        errors.push(ReachError {
            kind: ReachErrorKind::Orphan,
            message: format!("Unreachable node detected: {}", enriched.id()),
            file: enriched.file().to_string(),
        });
    }
    errors
}
