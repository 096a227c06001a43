//! Shape-expression validation engine.
//!
//! An independent constraint engine over the same node set as the
//! property-shape engine. A schema is a list of named shapes, each an
//! ordered conjunction of triple constraints. A constraint binds a
//! predicate IRI to cardinality bounds and an optional value expression:
//! either a node constraint (IRI-shaped, datatype, or enumerated values) or
//! a reference to another named shape, validated recursively against the
//! resolved target node.
//!
//! Predicates use full IRIs: rdf:type maps onto the `@type` key and
//! schema.org predicates map onto their bare key names. Type values are
//! normalized to the `https://schema.org/` form before membership checks,
//! so `WebPage`, `schema:WebPage`, and the full IRI all compare equal.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use vaultweave_core::iri::is_http_iri;
use vaultweave_core::node::{Node, CONTEXT_KEY, ID_KEY, TYPE_KEY};
use vaultweave_core::{VaultError, VaultResult};

use crate::report::{ShapeReport, Violation};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

const SCHEMA_ORG_HTTPS: &str = "https://schema.org/";
const SCHEMA_ORG_HTTP: &str = "http://schema.org/";
const SCHEMA_PREFIX: &str = "schema:";

/// Node kinds a value can be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Iri,
}

/// A value expression: a terminal node constraint or a shape reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ValueExpr {
    NodeConstraint {
        #[serde(default)]
        datatype: Option<String>,
        #[serde(default, rename = "nodeKind")]
        node_kind: Option<NodeKind>,
        #[serde(default)]
        values: Option<Vec<String>>,
    },
    ShapeRef {
        reference: String,
    },
}

/// One triple constraint: predicate, cardinality, optional value expression.
///
/// `min` defaults to 0; a missing or negative `max` means unbounded.
#[derive(Debug, Clone, Deserialize)]
pub struct TripleConstraint {
    pub predicate: String,
    #[serde(default, rename = "valueExpr")]
    pub value_expr: Option<ValueExpr>,
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<i64>,
}

impl TripleConstraint {
    fn min(&self) -> usize {
        self.min.unwrap_or(0) as usize
    }

    fn max(&self) -> Option<usize> {
        match self.max {
            Some(m) if m >= 0 => Some(m as usize),
            _ => None,
        }
    }
}

/// The conjunction of a shape's triple constraints.
#[derive(Debug, Clone, Deserialize)]
pub struct EachOf {
    pub expressions: Vec<TripleConstraint>,
}

/// A named shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Shape {
    pub id: String,
    #[serde(default)]
    pub closed: bool,
    pub expression: EachOf,
}

/// A shape-expression schema with an optional designated start shape.
#[derive(Debug, Clone, Deserialize)]
pub struct ExprSchema {
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub start: Option<String>,
    pub shapes: Vec<Shape>,
}

impl ExprSchema {
    pub fn from_str(text: &str) -> VaultResult<ExprSchema> {
        serde_json::from_str(text)
            .map_err(|e| VaultError::serialization(format!("invalid shape-expression schema: {e}")))
    }

    pub fn from_value(value: &Value) -> VaultResult<ExprSchema> {
        serde_json::from_value(value.clone())
            .map_err(|e| VaultError::serialization(format!("invalid shape-expression schema: {e}")))
    }
}

/// Map a predicate IRI onto the node key it constrains.
fn predicate_key(predicate: &str) -> &str {
    if predicate == RDF_TYPE {
        return TYPE_KEY;
    }
    predicate
        .strip_prefix(SCHEMA_ORG_HTTPS)
        .or_else(|| predicate.strip_prefix(SCHEMA_ORG_HTTP))
        .unwrap_or(predicate)
}

/// Normalize a type value to its full https://schema.org/ form.
fn normalize_type(value: &str) -> String {
    if value.starts_with(SCHEMA_ORG_HTTPS) {
        return value.to_string();
    }
    if let Some(rest) = value.strip_prefix(SCHEMA_PREFIX) {
        return format!("{SCHEMA_ORG_HTTPS}{rest}");
    }
    format!("{SCHEMA_ORG_HTTPS}{value}")
}

fn is_iri_value(value: &Value) -> bool {
    match value {
        Value::String(s) => is_http_iri(s),
        Value::Object(obj) => obj
            .get(ID_KEY)
            .and_then(Value::as_str)
            .map(is_http_iri)
            .unwrap_or(false),
        _ => false,
    }
}

fn matches_node_constraint(
    value: &Value,
    datatype: &Option<String>,
    node_kind: &Option<NodeKind>,
    values: &Option<Vec<String>>,
) -> bool {
    if matches!(node_kind, Some(NodeKind::Iri)) {
        return is_iri_value(value);
    }
    if datatype.is_some() {
        return value.is_string();
    }
    if let Some(allowed) = values {
        let Some(s) = value.as_str() else {
            return false;
        };
        let normalized = normalize_type(s);
        return allowed.iter().any(|v| normalize_type(v) == normalized);
    }
    true
}

fn resolve_node<'a>(nodes_by_id: &HashMap<&str, &'a Node>, value: &Value) -> Option<&'a Node> {
    let id = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get(ID_KEY).and_then(Value::as_str),
        _ => None,
    }?;
    nodes_by_id.get(id).copied()
}

/// The type values a start shape targets, taken from its own rdf:type
/// node constraint.
fn start_types(shape: &Shape) -> Vec<String> {
    let Some(constraint) = shape
        .expression
        .expressions
        .iter()
        .find(|c| c.predicate == RDF_TYPE)
    else {
        return Vec::new();
    };
    match &constraint.value_expr {
        Some(ValueExpr::NodeConstraint {
            values: Some(values),
            ..
        }) => values.iter().map(|v| normalize_type(v)).collect(),
        _ => Vec::new(),
    }
}

fn validate_shape(
    node: &Node,
    shape: &Shape,
    nodes_by_id: &HashMap<&str, &Node>,
    shapes_by_id: &HashMap<&str, &Shape>,
    out: &mut Vec<Violation>,
) {
    let mut allowed_keys: HashSet<&str> = [CONTEXT_KEY, ID_KEY, TYPE_KEY].into_iter().collect();

    for constraint in &shape.expression.expressions {
        let key = predicate_key(&constraint.predicate);
        allowed_keys.insert(key);

        let values = node.value_list(key);

        if values.len() < constraint.min() {
            out.push(expr_violation(
                node,
                shape,
                key,
                format!("Expected at least {} value(s)", constraint.min()),
            ));
            continue;
        }
        if let Some(max) = constraint.max() {
            if values.len() > max {
                out.push(expr_violation(
                    node,
                    shape,
                    key,
                    format!("Expected no more than {max} value(s)"),
                ));
                continue;
            }
        }

        let Some(value_expr) = &constraint.value_expr else {
            continue;
        };

        for value in &values {
            match value_expr {
                ValueExpr::NodeConstraint {
                    datatype,
                    node_kind,
                    values: allowed,
                } => {
                    if !matches_node_constraint(value, datatype, node_kind, allowed) {
                        out.push(expr_violation(
                            node,
                            shape,
                            key,
                            format!("Value does not match constraint for {key}"),
                        ));
                    }
                }
                ValueExpr::ShapeRef { reference } => {
                    let Some(target) = resolve_node(nodes_by_id, value) else {
                        out.push(expr_violation(
                            node,
                            shape,
                            key,
                            format!("Missing referenced node for {key}"),
                        ));
                        continue;
                    };
                    if let Some(nested) = shapes_by_id.get(reference.as_str()) {
                        validate_shape(target, nested, nodes_by_id, shapes_by_id, out);
                    }
                }
            }
        }
    }

    if shape.closed {
        for key in node.data.keys() {
            if !allowed_keys.contains(key.as_str()) {
                out.push(expr_violation(
                    node,
                    shape,
                    key,
                    format!("Unexpected property {key}"),
                ));
            }
        }
    }
}

fn expr_violation(node: &Node, shape: &Shape, path: &str, message: String) -> Violation {
    Violation {
        node_id: node.id.clone(),
        shape_id: shape.id.clone(),
        path: path.to_string(),
        message,
        value: None,
        source: Some(node.source.file.clone()),
    }
}

/// Validate nodes against a shape-expression schema.
///
/// With a declared start shape, only nodes whose type matches the start
/// shape's own rdf:type constraint are validated against it; without one,
/// every shape runs over every node.
pub fn validate(nodes: &[Node], schema: &ExprSchema) -> ShapeReport {
    let shapes_by_id: HashMap<&str, &Shape> = schema
        .shapes
        .iter()
        .map(|s| (s.id.as_str(), s))
        .collect();
    let nodes_by_id: HashMap<&str, &Node> =
        nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let start_shape = schema
        .start
        .as_deref()
        .and_then(|id| shapes_by_id.get(id).copied());
    let shapes_to_run: Vec<&Shape> = match start_shape {
        Some(shape) => vec![shape],
        None => schema.shapes.iter().collect(),
    };
    let target_types = start_shape.map(start_types).unwrap_or_default();

    let matching: Vec<&Node> = nodes
        .iter()
        .filter(|node| {
            target_types.is_empty()
                || node
                    .types()
                    .iter()
                    .any(|ty| target_types.contains(&normalize_type(ty)))
        })
        .collect();

    let mut violations = Vec::new();
    for shape in shapes_to_run {
        for node in &matching {
            validate_shape(node, shape, &nodes_by_id, &shapes_by_id, &mut violations);
        }
    }

    ShapeReport::from_violations(violations)
}
