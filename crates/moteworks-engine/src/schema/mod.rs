//! # Schemas
//!
//! The minimal slice of the mote schema model needed by the parser and the
//! commit engine: a schema declares where a mote's name lives and describes
//! the shape of its data well enough to resolve a path to the subschema
//! governing one field.
//!
//! Path resolution walks declared properties, falls back to additional
//! properties for free-form keys (e.g. `anykey`), and picks `one_of` variants
//! by comparing their `const` string properties against a sample of the data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::store::MoteDataPointer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{schema_id} schema not found in working copy")]
    NotFound { schema_id: String },
    #[error("schema path {path} does not exist at segment '{segment}'")]
    UnknownPath { path: String, segment: String },
    #[error("no one_of variant matches the sample data at {path}")]
    NoMatchingVariant { path: String },
    #[error("subschema at {path} is not a mote reference with allowed schemas")]
    NotAMoteReference { path: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatProperties {
    #[serde(default)]
    pub allow_schemas: Vec<String>,
}

/// A node of a schema tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    Object {
        #[serde(default)]
        properties: BTreeMap<String, SchemaNode>,
        #[serde(default)]
        additional_properties: Option<Box<SchemaNode>>,
    },
    OneOf {
        variants: Vec<SchemaNode>,
    },
    String {
        #[serde(default, rename = "const")]
        constant: Option<String>,
    },
    Number,
    Boolean,
    Array {
        items: Box<SchemaNode>,
    },
    /// A reference to another mote, restricted to the listed schemas.
    MoteId {
        #[serde(default)]
        format_properties: FormatProperties,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Pointer to the field holding a mote's display name.
    #[serde(default)]
    pub name: Option<MoteDataPointer>,
    pub root: SchemaNode,
}

impl SchemaNode {
    /// True when every `const` string property of this object node agrees
    /// with `sample`. Non-object nodes never match.
    fn matches_sample(&self, sample: Option<&Value>) -> bool {
        let SchemaNode::Object { properties, .. } = self else {
            return false;
        };
        properties.iter().all(|(key, prop)| match prop {
            SchemaNode::String {
                constant: Some(expected),
            } => sample
                .and_then(|s| s.get(key))
                .and_then(Value::as_str)
                .is_some_and(|actual| actual == expected),
            _ => true,
        })
    }

    fn select_variant<'a>(
        &'a self,
        sample: Option<&Value>,
        path: &[&str],
    ) -> Result<&'a SchemaNode, SchemaError> {
        match self {
            SchemaNode::OneOf { variants } => variants
                .iter()
                .find(|v| v.matches_sample(sample))
                .ok_or_else(|| SchemaError::NoMatchingVariant {
                    path: path.join("/"),
                }),
            other => Ok(other),
        }
    }
}

/// Resolves `path` (data-relative segments) against `schema`, using `sample`
/// (a mote-shaped value with a `data` field) to disambiguate `one_of` nodes.
pub fn resolve_pointer_in_schema<'a>(
    path: &[&str],
    sample: &Value,
    schema: &'a Schema,
) -> Result<&'a SchemaNode, SchemaError> {
    let mut node = &schema.root;
    let mut data = sample.get("data");

    for (depth, segment) in path.iter().enumerate() {
        node = node.select_variant(data, &path[..depth])?;
        node = match node {
            SchemaNode::Object {
                properties,
                additional_properties,
            } => properties
                .get(*segment)
                .or(additional_properties.as_deref()),
            SchemaNode::Array { items } => Some(items.as_ref()),
            _ => None,
        }
        .ok_or_else(|| SchemaError::UnknownPath {
            path: path.join("/"),
            segment: segment.to_string(),
        })?;
        data = data.and_then(|d| d.get(*segment));
    }

    node.select_variant(data, path)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn quest_schema() -> Schema {
        serde_json::from_value(json!({
            "id": "cl2_quest",
            "name": "data/name",
            "root": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "quest_start_moments": {
                        "type": "object",
                        "additional_properties": {
                            "type": "object",
                            "properties": {
                                "element": {
                                    "type": "one_of",
                                    "variants": [
                                        {
                                            "type": "object",
                                            "properties": {
                                                "style": { "type": "string", "const": "Emote" },
                                                "emoji": { "type": "string" }
                                            }
                                        },
                                        {
                                            "type": "object",
                                            "properties": {
                                                "style": { "type": "string", "const": "Dialogue" },
                                                "speech": {
                                                    "type": "object",
                                                    "properties": {
                                                        "speaker": {
                                                            "type": "mote_id",
                                                            "format_properties": { "allow_schemas": ["cl2_npc"] }
                                                        }
                                                    }
                                                }
                                            }
                                        }
                                    ]
                                }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn resolves_through_additional_properties_and_one_of() {
        let schema = quest_schema();
        let sample = json!({
            "data": { "quest_start_moments": { "anykey": { "element": {
                "style": "Dialogue", "speech": { "speaker": "any" }
            } } } }
        });
        let node = resolve_pointer_in_schema(
            &["quest_start_moments", "anykey", "element", "speech", "speaker"],
            &sample,
            &schema,
        )
        .unwrap();
        assert_eq!(
            node,
            &SchemaNode::MoteId {
                format_properties: FormatProperties {
                    allow_schemas: vec!["cl2_npc".into()]
                }
            }
        );
    }

    #[test]
    fn unmatched_variant_is_an_error() {
        let schema = quest_schema();
        let sample = json!({
            "data": { "quest_start_moments": { "k": { "element": { "style": "Nope" } } } }
        });
        let err = resolve_pointer_in_schema(
            &["quest_start_moments", "k", "element", "speech"],
            &sample,
            &schema,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::NoMatchingVariant { .. }));
    }

    #[test]
    fn unknown_property_is_an_error() {
        let schema = quest_schema();
        let err = resolve_pointer_in_schema(&["nope"], &json!({}), &schema).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownPath {
                path: "nope".into(),
                segment: "nope".into()
            }
        );
    }
}
