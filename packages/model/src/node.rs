//! # Document Nodes
//!
//! A document is a tree of [`Node`] values. Nodes are plain data: the
//! struct itself enforces nothing, all typing rules live in the
//! [`Schema`](crate::Schema) that constructed (or inspects) the tree.
//! This split is deliberate. It is what lets an unchecked constructor
//! hand out trees that violate their own schema, and what lets a
//! persisted tree be rehydrated verbatim, violations included.
//!
//! ## Sizes and positions
//!
//! Every node spans a whole number of position tokens:
//!
//! * a text node spans one token per character,
//! * any other childless leaf spans exactly one token,
//! * a parent spans the sum of its children plus two boundary tokens.
//!
//! Positions between tokens address points in the tree and are what
//! transforms operate on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attrs::Attrs;
use crate::error::SchemaError;
use crate::schema::Schema;

/// A mark applied to a node, such as emphasis or a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Mark type name, resolved against a schema when inspected.
    #[serde(rename = "type")]
    pub name: String,

    /// Attribute values, including defaults applied at creation.
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    /// Whether an equal mark (same type and attributes) is in `set`.
    pub fn is_in_set(&self, set: &[Mark]) -> bool {
        set.contains(self)
    }

    /// Returns a copy of `set` with this mark added, keeping the set
    /// ordered by mark rank. An existing mark of the same type is
    /// replaced. Marks of a type the schema does not know sort last.
    pub fn add_to_set(&self, set: &[Mark], schema: &Schema) -> Vec<Mark> {
        let rank = |mark: &Mark| schema.mark_rank(&mark.name).unwrap_or(usize::MAX);
        let mut out: Vec<Mark> = set
            .iter()
            .filter(|existing| existing.name != self.name)
            .cloned()
            .collect();
        let own = rank(self);
        let at = out
            .iter()
            .position(|existing| rank(existing) > own)
            .unwrap_or(out.len());
        out.insert(at, self.clone());
        out
    }
}

/// A single node in a document tree.
///
/// The field layout mirrors the serialized form: `name` serializes as
/// `"type"`, and empty collections are omitted entirely so that stored
/// documents stay compact and stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node type name, resolved against a schema when inspected.
    #[serde(rename = "type")]
    pub name: String,

    /// Attribute values, including defaults applied at creation.
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,

    /// Child nodes, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    /// Marks applied to this node, ordered by mark rank.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,

    /// Text carried by a text node. `None` for every other type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    /// Number of characters in a text node, `0` otherwise.
    pub fn text_len(&self) -> usize {
        self.text.as_deref().map_or(0, |text| text.chars().count())
    }

    /// Number of position tokens this node spans.
    ///
    /// Text nodes span one token per character. Leaf types span one
    /// token. Every other node spans its content plus two boundary
    /// tokens, so an empty paragraph still has size 2. A childless
    /// node of a type the schema does not know counts as a leaf.
    pub fn node_size(&self, schema: &Schema) -> usize {
        if self.is_text() {
            return self.text_len();
        }
        let leaf = schema
            .node_type(&self.name)
            .map_or(true, |node_type| node_type.is_leaf());
        if leaf {
            1
        } else {
            self.content_size(schema) + 2
        }
    }

    /// Combined size of this node's children.
    pub fn content_size(&self, schema: &Schema) -> usize {
        self.content
            .iter()
            .map(|child| child.node_size(schema))
            .sum()
    }

    /// Compact single-line rendering of the tree, for logs and tests.
    ///
    /// Text comes out quoted, marks wrap their target outermost first,
    /// so a bold link renders as `link(bold("hi"))`.
    pub fn describe(&self) -> String {
        let mut base = if let Some(text) = &self.text {
            format!("{:?}", text)
        } else if self.content.is_empty() {
            self.name.clone()
        } else {
            let children: Vec<String> = self.content.iter().map(Node::describe).collect();
            format!("{}({})", self.name, children.join(", "))
        };
        for mark in self.marks.iter().rev() {
            base = format!("{}({})", mark.name, base);
        }
        base
    }

    /// Walks the tree and collects every place where it disagrees with
    /// `schema`: unknown types, content that does not match the parent
    /// type's content expression, and marks applied where the parent
    /// does not allow them.
    ///
    /// This is an observation, not a gate. Nothing in the crate calls
    /// it on your behalf.
    pub fn violations(&self, schema: &Schema) -> Vec<ContentViolation> {
        let mut found = Vec::new();
        self.collect_violations(schema, &self.name, &mut found);
        found
    }

    /// Like [`violations`](Node::violations), but stops at the first
    /// problem and reports it as an error.
    pub fn check(&self, schema: &Schema) -> Result<(), SchemaError> {
        match self.violations(schema).into_iter().next() {
            None => Ok(()),
            Some(violation) => Err(SchemaError::InvalidContent {
                at: violation.at,
                message: violation.message,
            }),
        }
    }

    fn collect_violations(&self, schema: &Schema, at: &str, found: &mut Vec<ContentViolation>) {
        let node_type = match schema.node_type(&self.name) {
            Ok(node_type) => node_type,
            Err(_) => {
                found.push(ContentViolation {
                    at: at.to_string(),
                    message: format!("unknown node type {}", self.name),
                });
                return;
            }
        };
        if self.is_text() {
            if !node_type.is_text() {
                found.push(ContentViolation {
                    at: at.to_string(),
                    message: format!("node type {} cannot hold text", self.name),
                });
            }
            if !self.content.is_empty() {
                found.push(ContentViolation {
                    at: at.to_string(),
                    message: "text node has children".to_string(),
                });
            }
            return;
        }
        match schema.valid_content(&self.name, &self.content) {
            Ok(true) => {}
            Ok(false) => {
                found.push(ContentViolation {
                    at: at.to_string(),
                    message: format!(
                        "content {} does not match {:?}",
                        summarize_children(&self.content),
                        node_type.content_source().unwrap_or("")
                    ),
                });
            }
            // Unknown child types are reported by the recursion below.
            Err(_) => {}
        }
        for (index, child) in self.content.iter().enumerate() {
            let child_at = format!("{}/{}[{}]", at, child.name, index);
            for mark in &child.marks {
                match schema.mark_type(&mark.name) {
                    Err(_) => found.push(ContentViolation {
                        at: child_at.clone(),
                        message: format!("unknown mark type {}", mark.name),
                    }),
                    Ok(_) => {
                        if !node_type.allows_mark_name(&mark.name) {
                            found.push(ContentViolation {
                                at: child_at.clone(),
                                message: format!(
                                    "mark {} is not allowed in {}",
                                    mark.name, self.name
                                ),
                            });
                        }
                    }
                }
            }
            child.collect_violations(schema, &child_at, found);
        }
    }
}

fn summarize_children(children: &[Node]) -> String {
    if children.is_empty() {
        return "()".to_string();
    }
    let names: Vec<&str> = children.iter().map(|child| child.name.as_str()).collect();
    format!("({})", names.join(", "))
}

/// One disagreement between a tree and a schema, with a path to the
/// offending node.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentViolation {
    /// Path from the root, like `doc/table[0]/table_row[1]`.
    pub at: String,
    pub message: String,
}

impl fmt::Display for ContentViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.at, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Node {
        Node {
            name: "text".to_string(),
            attrs: Attrs::new(),
            content: vec![],
            marks: vec![],
            text: Some(value.to_string()),
        }
    }

    #[test]
    fn serializes_without_empty_fields() {
        let node = text("hi");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "text", "text": "hi" }));
    }

    #[test]
    fn deserializes_missing_fields_as_defaults() {
        let node: Node = serde_json::from_value(serde_json::json!({ "type": "horizontal_rule" }))
            .unwrap();
        assert_eq!(node.name, "horizontal_rule");
        assert!(node.attrs.is_empty());
        assert!(node.content.is_empty());
        assert!(node.marks.is_empty());
        assert_eq!(node.text, None);
    }

    #[test]
    fn text_len_counts_characters() {
        assert_eq!(text("héllo").text_len(), 5);
        assert_eq!(text("").text_len(), 0);
    }

    #[test]
    fn describe_nests_marks_outermost_first() {
        let mut node = text("hi");
        node.marks = vec![
            Mark {
                name: "link".to_string(),
                attrs: Attrs::new(),
            },
            Mark {
                name: "bold".to_string(),
                attrs: Attrs::new(),
            },
        ];
        assert_eq!(node.describe(), "link(bold(\"hi\"))");
    }

    #[test]
    fn mark_membership_requires_equal_attrs() {
        let plain = Mark {
            name: "link".to_string(),
            attrs: Attrs::new(),
        };
        let mut with_href = plain.clone();
        with_href
            .attrs
            .insert("href".to_string(), serde_json::json!("/a"));
        let set = vec![with_href.clone()];
        assert!(with_href.is_in_set(&set));
        assert!(!plain.is_in_set(&set));
        assert!(!plain.is_in_set(&[]));
    }
}
