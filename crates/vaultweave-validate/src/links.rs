//! Link-integrity validation.
//!
//! Walks every node and every embedded reference and checks three things,
//! fail-fast in document order:
//!   - no `@id` is defined twice, whether at the top level or inline,
//!   - reference nodes live under the refs directory in a file named after
//!     the identifier's trailing slug,
//!   - every same-origin link resolves to a defined node, where a fragment
//!     link also resolves through its fragment-free base.
//!
//! External links (a different origin than any defined node) are never
//! checked. The first violation found is returned alone.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use vaultweave_core::iri::{origin, split_fragment, tail_slug};
use vaultweave_core::node::Node;
use vaultweave_core::walk::{collect_refs, RefKind};

/// Node types that must live under [`REFS_DIR`].
pub const REFERENCE_TYPES: &[&str] = &["Reference"];

/// Directory path segment reserved for reference nodes.
pub const REFS_DIR: &str = "refs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkErrorKind {
    DuplicateId,
    MisplacedReference,
    UnresolvedLink,
}

/// A single link-integrity violation.
#[derive(Debug, Clone)]
pub struct LinkError {
    pub kind: LinkErrorKind,
    pub message: String,
    pub file: String,
    pub detail: Option<String>,
}

struct PendingLink {
    id: String,
    file: String,
    source_id: String,
}

/// `true` when the file sits under a `refs` path segment and its stem
/// matches the identifier's trailing slug.
fn placed_as_reference(id: &str, file: &str) -> bool {
    let under_refs = file.split(['/', '\\']).any(|seg| seg == REFS_DIR);
    if !under_refs {
        return false;
    }
    let stem = Path::new(file).file_stem().and_then(|s| s.to_str());
    match (stem, tail_slug(id)) {
        (Some(stem), Some(slug)) => stem == slug.as_str(),
        _ => false,
    }
}

/// Validate link integrity across the node set.
///
/// Returns an empty vector when the vault is consistent, or a vector
/// holding the first violation encountered.
pub fn validate_link_integrity(nodes: &[Node]) -> Vec<LinkError> {
    let mut definitions: BTreeMap<String, String> = BTreeMap::new();
    let mut links: Vec<PendingLink> = Vec::new();

    for node in nodes {
        if let Some(existing) = definitions.get(&node.id) {
            return vec![LinkError {
                kind: LinkErrorKind::DuplicateId,
                message: format!(
                    "Duplicate @id found: {} ({existing} and {})",
                    node.id, node.source.file
                ),
                file: node.source.file.clone(),
                detail: None,
            }];
        }
        definitions.insert(node.id.clone(), node.source.file.clone());

        if REFERENCE_TYPES.iter().any(|ty| node.has_type(ty))
            && !placed_as_reference(&node.id, &node.source.file)
        {
            return vec![LinkError {
                kind: LinkErrorKind::MisplacedReference,
                message: format!(
                    "Reference node must live under {REFS_DIR}/ and match filename: {}",
                    node.id
                ),
                file: node.source.file.clone(),
                detail: None,
            }];
        }

        for found in collect_refs(node) {
            match found.kind {
                RefKind::InlineDefinition => {
                    if let Some(existing) = definitions.get(&found.id) {
                        return vec![LinkError {
                            kind: LinkErrorKind::DuplicateId,
                            message: format!(
                                "Duplicate @id found: {} ({existing} and {})",
                                found.id, node.source.file
                            ),
                            file: node.source.file.clone(),
                            detail: None,
                        }];
                    }
                    definitions.insert(found.id, node.source.file.clone());
                }
                RefKind::Reference => links.push(PendingLink {
                    id: found.id,
                    file: node.source.file.clone(),
                    source_id: node.id.clone(),
                }),
            }
        }
    }

    let internal_origins: BTreeSet<String> =
        definitions.keys().filter_map(|id| origin(id)).collect();

    for link in &links {
        let Some(link_origin) = origin(&link.id) else {
            continue;
        };
        if !internal_origins.contains(&link_origin) {
            continue;
        }
        if definitions.contains_key(&link.id) {
            continue;
        }
        let base = split_fragment(&link.id);
        if base != link.id && definitions.contains_key(base) {
            continue;
        }
        return vec![LinkError {
            kind: LinkErrorKind::UnresolvedLink,
            message: format!("Unresolved internal link: {}", link.id),
            file: link.file.clone(),
            detail: Some(link.source_id.clone()),
        }];
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultweave_core::node::extract_nodes;

    fn node(value: serde_json::Value, file: &str) -> Node {
        extract_nodes(&value, file).remove(0)
    }

    #[test]
    fn consistent_vault_yields_no_errors() {
        let nodes = vec![
            node(
                json!({
                    "@id": "https://e.org/",
                    "@type": "Catalog",
                    "about": { "@id": "https://e.org/page" }
                }),
                "vault/index.jsonld",
            ),
            node(json!({ "@id": "https://e.org/page" }), "vault/page.jsonld"),
        ];
        assert!(validate_link_integrity(&nodes).is_empty());
    }

    #[test]
    fn duplicate_top_level_id_is_fatal() {
        let nodes = vec![
            node(json!({ "@id": "https://e.org/page" }), "vault/a.jsonld"),
            node(json!({ "@id": "https://e.org/page" }), "vault/b.jsonld"),
        ];
        let errors = validate_link_integrity(&nodes);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::DuplicateId);
        assert_eq!(
            errors[0].message,
            "Duplicate @id found: https://e.org/page (vault/a.jsonld and vault/b.jsonld)"
        );
    }

    #[test]
    fn inline_definition_colliding_with_top_level_is_fatal() {
        let nodes = vec![
            node(json!({ "@id": "https://e.org/person" }), "vault/person.jsonld"),
            node(
                json!({
                    "@id": "https://e.org/page",
                    "author": { "@id": "https://e.org/person", "name": "A" }
                }),
                "vault/page.jsonld",
            ),
        ];
        let errors = validate_link_integrity(&nodes);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::DuplicateId);
    }

    #[test]
    fn reference_node_outside_refs_dir_is_fatal() {
        let nodes = vec![node(
            json!({ "@id": "https://e.org/people/alice", "@type": "Reference" }),
            "vault/alice.jsonld",
        )];
        let errors = validate_link_integrity(&nodes);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::MisplacedReference);
    }

    #[test]
    fn reference_node_under_refs_with_matching_stem_is_fine() {
        let nodes = vec![node(
            json!({ "@id": "https://e.org/people/alice", "@type": "Reference" }),
            "vault/refs/alice.jsonld",
        )];
        assert!(validate_link_integrity(&nodes).is_empty());
    }

    #[test]
    fn reference_stem_mismatch_is_fatal() {
        let nodes = vec![node(
            json!({ "@id": "https://e.org/people/alice", "@type": "Reference" }),
            "vault/refs/bob.jsonld",
        )];
        let errors = validate_link_integrity(&nodes);
        assert_eq!(errors[0].kind, LinkErrorKind::MisplacedReference);
    }

    #[test]
    fn unresolved_same_origin_link_is_fatal() {
        let nodes = vec![node(
            json!({
                "@id": "https://e.org/page",
                "about": { "@id": "https://e.org/missing" }
            }),
            "vault/page.jsonld",
        )];
        let errors = validate_link_integrity(&nodes);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::UnresolvedLink);
        assert_eq!(errors[0].message, "Unresolved internal link: https://e.org/missing");
        assert_eq!(errors[0].detail.as_deref(), Some("https://e.org/page"));
    }

    #[test]
    fn external_origin_links_are_never_checked() {
        let nodes = vec![node(
            json!({
                "@id": "https://e.org/page",
                "sameAs": { "@id": "https://other.example/profile" }
            }),
            "vault/page.jsonld",
        )];
        assert!(validate_link_integrity(&nodes).is_empty());
    }

    #[test]
    fn fragment_link_resolves_through_its_base() {
        let nodes = vec![
            node(json!({ "@id": "https://e.org/page" }), "vault/page.jsonld"),
            node(
                json!({
                    "@id": "https://e.org/index",
                    "hasPart": { "@id": "https://e.org/page#section" }
                }),
                "vault/index.jsonld",
            ),
        ];
        assert!(validate_link_integrity(&nodes).is_empty());
    }

    #[test]
    fn first_violation_wins_in_document_order() {
        // A duplicate id appears before an unresolved link; only the
        // duplicate is reported.
        let nodes = vec![
            node(json!({ "@id": "https://e.org/a" }), "vault/a.jsonld"),
            node(json!({ "@id": "https://e.org/a" }), "vault/a2.jsonld"),
            node(
                json!({ "@id": "https://e.org/b", "about": { "@id": "https://e.org/missing" } }),
                "vault/b.jsonld",
            ),
        ];
        let errors = validate_link_integrity(&nodes);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::DuplicateId);
    }
}
