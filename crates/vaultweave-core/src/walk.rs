//! Shared reference tree-walk.
//!
//! Both the link-integrity and reachability validators need the same
//! traversal: visit every nested value of a node, skipping `@context`, and
//! report every nested object that carries an `@id`. A found object with no
//! keys beyond `@id`/`@type` is a reference to another node; one with extra
//! properties is an inline definition of a node in its own right.
//!
//! The walk never reports the top-level node itself and keeps recursing
//! inside found objects, so references nested under inline definitions are
//! still collected.

use serde_json::{Map, Value};

use crate::node::{Node, CONTEXT_KEY, ID_KEY, TYPE_KEY};

/// How a nested identifier-bearing object is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Carries only `@id` (and optionally `@type`): points at another node.
    Reference,
    /// Carries additional properties: defines a node inline.
    InlineDefinition,
}

/// A nested identifier found during the walk, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundRef {
    pub id: String,
    pub kind: RefKind,
}

/// Collect every nested identifier-bearing object under a node.
pub fn collect_refs(node: &Node) -> Vec<FoundRef> {
    let mut found = Vec::new();
    // The top-level node's own @id is a definition, not a reference.
    for (key, value) in &node.data {
        if key == CONTEXT_KEY {
            continue;
        }
        visit(value, &mut found);
    }
    found
}

fn visit(value: &Value, found: &mut Vec<FoundRef>) {
    match value {
        Value::Array(items) => {
            for item in items {
                visit(item, found);
            }
        }
        Value::Object(obj) => {
            if let Some(id) = obj.get(ID_KEY).and_then(Value::as_str) {
                found.push(FoundRef {
                    id: id.to_string(),
                    kind: classify(obj),
                });
            }
            for (key, entry) in obj {
                if key == CONTEXT_KEY {
                    continue;
                }
                visit(entry, found);
            }
        }
        _ => {}
    }
}

fn classify(obj: &Map<String, Value>) -> RefKind {
    let has_extra = obj
        .keys()
        .any(|k| k != ID_KEY && k != TYPE_KEY && k != CONTEXT_KEY);
    if has_extra {
        RefKind::InlineDefinition
    } else {
        RefKind::Reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::extract_nodes;
    use serde_json::json;

    fn node(value: serde_json::Value) -> Node {
        extract_nodes(&value, "f.jsonld").remove(0)
    }

    #[test]
    fn collects_references_and_inline_definitions() {
        let n = node(json!({
            "@id": "https://example.org/page",
            "about": { "@id": "https://example.org/topic", "@type": "Thing" },
            "author": { "@id": "https://example.org/people/a", "name": "A" }
        }));
        let refs = collect_refs(&n);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].id, "https://example.org/topic");
        assert_eq!(refs[0].kind, RefKind::Reference);
        assert_eq!(refs[1].id, "https://example.org/people/a");
        assert_eq!(refs[1].kind, RefKind::InlineDefinition);
    }

    #[test]
    fn walks_into_arrays_and_nested_objects() {
        let n = node(json!({
            "@id": "https://example.org/page",
            "mentions": [
                { "@id": "https://example.org/a" },
                { "items": [{ "@id": "https://example.org/b" }] }
            ]
        }));
        let refs = collect_refs(&n);
        let ids: Vec<&str> = refs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["https://example.org/a", "https://example.org/b"]);
    }

    #[test]
    fn recurses_inside_inline_definitions() {
        let n = node(json!({
            "@id": "https://example.org/page",
            "author": {
                "@id": "https://example.org/people/a",
                "worksFor": { "@id": "https://example.org/org" }
            }
        }));
        let refs = collect_refs(&n);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].id, "https://example.org/org");
        assert_eq!(refs[1].kind, RefKind::Reference);
    }

    #[test]
    fn skips_context_and_top_level_id() {
        let n = node(json!({
            "@id": "https://example.org/page",
            "@context": { "@id": "https://example.org/context-not-a-ref" },
            "name": "plain"
        }));
        assert!(collect_refs(&n).is_empty());
    }

    #[test]
    fn context_key_is_ignored_when_classifying() {
        let n = node(json!({
            "@id": "https://example.org/page",
            "about": { "@id": "https://example.org/topic", "@context": "https://schema.org/" }
        }));
        let refs = collect_refs(&n);
        assert_eq!(refs[0].kind, RefKind::Reference);
    }
}
