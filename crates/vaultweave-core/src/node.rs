//! Vault node model and node extraction.
//!
//! A vault is a tree of linked-data documents. Each document yields zero or
//! more nodes: open string-keyed records carrying an `@id` identifier and an
//! optional `@type`. Nodes keep their data exactly as authored (reserved keys
//! included) and carry provenance out-of-band, so canonical hashing over the
//! data is never polluted by source metadata.
//!
//! Extraction is a pure function over already-parsed values; loading and
//! parsing files is the caller's job.

use serde_json::{Map, Value};

/// Reserved JSON-LD keys.
pub const ID_KEY: &str = "@id";
pub const TYPE_KEY: &str = "@type";
pub const CONTEXT_KEY: &str = "@context";
pub const GRAPH_KEY: &str = "@graph";

/// Node statuses exempt from publication requirements.
pub const EXEMPT_STATUSES: &[&str] = &["draft", "private"];

const STATUS_KEY: &str = "status";

/// Provenance for a node: the file it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub file: String,
}

/// One addressable record in the content graph.
///
/// `data` holds the node object exactly as authored, including the reserved
/// `@id`/`@type` keys. `id` is the extracted identifier, duplicated for
/// convenience. Nodes are immutable once extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub data: Map<String, Value>,
    pub source: SourceRef,
}

impl Node {
    fn from_object(obj: &Map<String, Value>, file: &str) -> Option<Node> {
        let id = obj.get(ID_KEY)?.as_str()?;
        if id.is_empty() {
            return None;
        }
        Some(Node {
            id: id.to_string(),
            data: obj.clone(),
            source: SourceRef {
                file: file.to_string(),
            },
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// The node's `@type` values, string-or-array normalized to a list.
    pub fn types(&self) -> Vec<&str> {
        type_list(self.data.get(TYPE_KEY))
    }

    pub fn has_type(&self, ty: &str) -> bool {
        self.types().contains(&ty)
    }

    /// The node's value list for a property: absent is empty, a scalar is a
    /// singleton, an array is itself.
    pub fn value_list(&self, key: &str) -> Vec<&Value> {
        match self.data.get(key) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().collect(),
            Some(value) => vec![value],
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.data.get(STATUS_KEY).and_then(Value::as_str)
    }

    /// Draft and private nodes are exempt from reachability requirements.
    pub fn is_draft_or_private(&self) -> bool {
        self.status()
            .map(|s| EXEMPT_STATUSES.contains(&s))
            .unwrap_or(false)
    }
}

/// Normalize a string-or-array-of-strings type value to a list.
/// Non-string entries are dropped.
pub fn type_list(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// A parsed vault document, tagged with its source file.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub value: Value,
    pub file: String,
}

/// An unparseable-document report produced by the external loader.
///
/// Load errors are fatal: the orchestrator aborts the pipeline when any are
/// present instead of validating a partial vault.
#[derive(Debug, Clone)]
pub struct LoadError {
    pub message: String,
    pub file: String,
}

/// Extract nodes from one parsed document.
///
/// Three document shapes are accepted:
/// - an object with an `@graph` array (each member with an `@id` is a node)
/// - a bare array of node-like objects
/// - a single object with an `@id`
///
/// Objects without an `@id` are silently dropped.
pub fn extract_nodes(doc: &Value, file: &str) -> Vec<Node> {
    let mut nodes = Vec::new();

    match doc {
        Value::Object(obj) => {
            if let Some(Value::Array(graph)) = obj.get(GRAPH_KEY) {
                for entry in graph {
                    if let Value::Object(o) = entry {
                        if let Some(node) = Node::from_object(o, file) {
                            nodes.push(node);
                        }
                    }
                }
                return nodes;
            }
            if let Some(node) = Node::from_object(obj, file) {
                nodes.push(node);
            }
        }
        Value::Array(items) => {
            for entry in items {
                if let Value::Object(o) = entry {
                    if let Some(node) = Node::from_object(o, file) {
                        nodes.push(node);
                    }
                }
            }
        }
        _ => {}
    }

    nodes
}

/// Extract nodes from a batch of documents, in document order.
pub fn extract_all(documents: &[SourceDocument]) -> Vec<Node> {
    let mut nodes = Vec::new();
    for doc in documents {
        nodes.extend(extract_nodes(&doc.value, &doc.file));
    }
    nodes
}
