//! Property-shape validation engine.
//!
//! Shapes target nodes by type and constrain individual properties:
//! cardinality bounds, datatype predicates, regex patterns, enumerated
//! values, and required classes for nested objects. A closed shape
//! additionally forbids any property it does not declare or ignore.
//!
//! Shapes documents are parsed and compiled up front: invalid regexes,
//! inverted cardinality bounds, and duplicate property paths are
//! configuration errors reported at load time, never mid-validation.
//! Validation itself aggregates every violation and never short-circuits.

use std::collections::HashSet;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use url::Url;

use vaultweave_core::node::{type_list, Node, CONTEXT_KEY, GRAPH_KEY, ID_KEY, TYPE_KEY};
use vaultweave_core::{VaultError, VaultResult};

use crate::report::{ShapeReport, Violation};

/// Keys never flagged by closed shapes.
pub const RESERVED_KEYS: &[&str] = &[ID_KEY, TYPE_KEY, CONTEXT_KEY, GRAPH_KEY];

/// The fixed datatype vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Datatype {
    #[serde(rename = "xsd:string")]
    String,
    #[serde(rename = "xsd:boolean")]
    Boolean,
    #[serde(rename = "xsd:integer")]
    Integer,
    #[serde(rename = "xsd:decimal")]
    Decimal,
    #[serde(rename = "xsd:date")]
    Date,
    #[serde(rename = "xsd:dateTime")]
    DateTime,
    #[serde(rename = "xsd:anyURI")]
    AnyUri,
}

impl Datatype {
    fn name(&self) -> &'static str {
        match self {
            Datatype::String => "xsd:string",
            Datatype::Boolean => "xsd:boolean",
            Datatype::Integer => "xsd:integer",
            Datatype::Decimal => "xsd:decimal",
            Datatype::Date => "xsd:date",
            Datatype::DateTime => "xsd:dateTime",
            Datatype::AnyUri => "xsd:anyURI",
        }
    }
}

/// One property constraint within a node shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyShape {
    pub path: String,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
    pub datatype: Option<Datatype>,
    pub pattern: Option<String>,
    #[serde(rename = "in")]
    pub allowed: Option<Vec<String>>,
    pub class: Option<String>,
    pub message: Option<String>,
}

/// A shape targeting every node of a given type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NodeShape {
    pub id: String,
    pub target_class: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub ignored_properties: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyShape>,
}

/// The shapes document as authored: an ordered list of node shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapesDocument {
    pub shapes: Vec<NodeShape>,
}

impl ShapesDocument {
    pub fn from_str(text: &str) -> VaultResult<CompiledShapes> {
        let doc: ShapesDocument = serde_json::from_str(text)
            .map_err(|e| VaultError::serialization(format!("invalid shapes document: {e}")))?;
        doc.compile()
    }

    pub fn from_value(value: &Value) -> VaultResult<CompiledShapes> {
        let doc: ShapesDocument = serde_json::from_value(value.clone())
            .map_err(|e| VaultError::serialization(format!("invalid shapes document: {e}")))?;
        doc.compile()
    }

    /// Check configuration invariants and precompile patterns.
    pub fn compile(self) -> VaultResult<CompiledShapes> {
        let mut compiled = Vec::with_capacity(self.shapes.len());
        for shape in self.shapes {
            let mut seen_paths = HashSet::new();
            let mut patterns = Vec::with_capacity(shape.properties.len());
            for property in &shape.properties {
                if !seen_paths.insert(property.path.as_str()) {
                    return Err(VaultError::invalid_argument(format!(
                        "shape {}: duplicate property shape path: {}",
                        shape.id, property.path
                    )));
                }
                if let (Some(min), Some(max)) = (property.min_count, property.max_count) {
                    if min > max {
                        return Err(VaultError::invalid_argument(format!(
                            "shape {}: minCount cannot be greater than maxCount on {}",
                            shape.id, property.path
                        )));
                    }
                }
                let regex = match &property.pattern {
                    Some(pattern) => Some(Regex::new(pattern).map_err(|_| {
                        VaultError::invalid_argument(format!(
                            "shape {}: invalid regex pattern: {}",
                            shape.id, pattern
                        ))
                    })?),
                    None => None,
                };
                patterns.push(regex);
            }
            compiled.push(CompiledShape { shape, patterns });
        }
        Ok(CompiledShapes { shapes: compiled })
    }
}

/// A shapes document with patterns compiled, ready for validation.
#[derive(Debug, Clone)]
pub struct CompiledShapes {
    shapes: Vec<CompiledShape>,
}

#[derive(Debug, Clone)]
struct CompiledShape {
    shape: NodeShape,
    // Parallel to shape.properties.
    patterns: Vec<Option<Regex>>,
}

impl CompiledShapes {
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Validate every node against every shape whose target type it carries.
pub fn validate(nodes: &[Node], shapes: &CompiledShapes) -> ShapeReport {
    let mut violations = Vec::new();

    for compiled in &shapes.shapes {
        let shape = &compiled.shape;
        for node in nodes {
            if !node.has_type(&shape.target_class) {
                continue;
            }
            for (property, regex) in shape.properties.iter().zip(&compiled.patterns) {
                check_property(node, shape, property, regex.as_ref(), &mut violations);
            }
            check_closed(node, shape, &mut violations);
        }
    }

    ShapeReport::from_violations(violations)
}

fn violation(
    node: &Node,
    shape: &NodeShape,
    path: &str,
    message: String,
    value: Option<Value>,
) -> Violation {
    Violation {
        node_id: node.id.clone(),
        shape_id: shape.id.clone(),
        path: path.to_string(),
        message,
        value,
        source: Some(node.source.file.clone()),
    }
}

fn check_property(
    node: &Node,
    shape: &NodeShape,
    property: &PropertyShape,
    regex: Option<&Regex>,
    out: &mut Vec<Violation>,
) {
    let values = node.value_list(&property.path);
    let message = |default: String| property.message.clone().unwrap_or(default);

    if let Some(min) = property.min_count {
        if (values.len() as u32) < min {
            out.push(violation(
                node,
                shape,
                &property.path,
                message(format!("Expected at least {min} value(s)")),
                None,
            ));
        }
    }

    if let Some(max) = property.max_count {
        if (values.len() as u32) > max {
            out.push(violation(
                node,
                shape,
                &property.path,
                message(format!("Expected no more than {max} value(s)")),
                node.get(&property.path).cloned(),
            ));
        }
    }

    if let Some(datatype) = property.datatype {
        for item in &values {
            if !datatype_matches(item, datatype) {
                out.push(violation(
                    node,
                    shape,
                    &property.path,
                    message(format!("Expected datatype {}", datatype.name())),
                    Some((*item).clone()),
                ));
            }
        }
    }

    if let Some(regex) = regex {
        for item in &values {
            let matches = item.as_str().map(|s| regex.is_match(s)).unwrap_or(false);
            if !matches {
                out.push(violation(
                    node,
                    shape,
                    &property.path,
                    message(format!(
                        "Value does not match pattern {}",
                        property.pattern.as_deref().unwrap_or_default()
                    )),
                    Some((*item).clone()),
                ));
            }
        }
    }

    if let Some(allowed) = &property.allowed {
        for item in &values {
            let ok = comparable(item)
                .map(|c| allowed.iter().any(|a| a == c))
                .unwrap_or(false);
            if !ok {
                out.push(violation(
                    node,
                    shape,
                    &property.path,
                    message(format!("Value must be one of: {}", allowed.join(", "))),
                    Some((*item).clone()),
                ));
            }
        }
    }

    if let Some(class) = &property.class {
        for item in &values {
            if !has_class(item, class) {
                out.push(violation(
                    node,
                    shape,
                    &property.path,
                    message(format!("Value must be a {class} node")),
                    Some((*item).clone()),
                ));
            }
        }
    }
}

fn check_closed(node: &Node, shape: &NodeShape, out: &mut Vec<Violation>) {
    if !shape.closed {
        return;
    }
    let mut allowed: HashSet<&str> = RESERVED_KEYS.iter().copied().collect();
    allowed.extend(shape.ignored_properties.iter().map(String::as_str));
    allowed.extend(shape.properties.iter().map(|p| p.path.as_str()));

    for key in node.data.keys() {
        if !allowed.contains(key.as_str()) {
            out.push(violation(
                node,
                shape,
                key,
                "Property not allowed by closed shape".to_string(),
                None,
            ));
        }
    }
}

/// The comparable form of a value for `in` membership: its string literal,
/// or its `@id` if it is a reference object.
fn comparable(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get(ID_KEY).and_then(Value::as_str),
        _ => None,
    }
}

fn has_class(value: &Value, class: &str) -> bool {
    match value {
        Value::Object(obj) => type_list(obj.get(TYPE_KEY)).contains(&class),
        _ => false,
    }
}

fn datatype_matches(value: &Value, datatype: Datatype) -> bool {
    match datatype {
        Datatype::String => value.is_string(),
        Datatype::Boolean => value.is_boolean(),
        Datatype::Integer => is_integer(value),
        Datatype::Decimal => value.is_number(),
        Datatype::Date => value.as_str().map(is_date).unwrap_or(false),
        Datatype::DateTime => value.as_str().map(is_date_time).unwrap_or(false),
        Datatype::AnyUri => value
            .as_str()
            .map(|s| Url::parse(s).is_ok())
            .unwrap_or(false),
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
        }
        _ => false,
    }
}

fn is_date(s: &str) -> bool {
    Date::parse(s, format_description!("[year]-[month]-[day]")).is_ok()
}

fn is_date_time(s: &str) -> bool {
    if !s.contains('T') {
        return false;
    }
    OffsetDateTime::parse(s, &Rfc3339).is_ok()
        || PrimitiveDateTime::parse(s, &Iso8601::DEFAULT).is_ok()
}
