//! # Transactions
//!
//! A [`Transaction`] is an ordered list of steps applied to a document
//! as one edit. Steps address the document through position tokens
//! (see [`Node::node_size`]) and are tolerant by construction:
//! positions are clamped into range and positions that land somewhere
//! nothing can be inserted snap to the nearest usable boundary.
//!
//! What steps do not do is validate. An insertion lands where it lands
//! whether or not the surrounding content expression allows it there;
//! checking is a separate, explicit act.
//!
//! ## Where an insertion lands
//!
//! Resolving an insert position inside a child depends on what the
//! child is:
//!
//! * an isolating node refuses to let the edit cross into it; the new
//!   node snaps before it (position at its opening boundary) or after
//!   it (anywhere else inside),
//! * a textblock splits in two around an interior position, attributes
//!   copied to both halves,
//! * any other non-leaf container is entered recursively,
//! * positions inside leaves and text runs snap past them.

use thiserror::Error;

use vellum_model::{Node, Schema};

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Delete range {from}..{to} is inverted")]
    InvertedRange { from: usize, to: usize },

    #[error("Cannot insert into leaf node {0}")]
    CannotInsert(String),
}

/// A single document edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Insert `node` at a position in the document.
    Insert { pos: usize, node: Node },
    /// Delete everything between two positions.
    Delete { from: usize, to: usize },
}

/// An ordered list of steps, applied atomically to a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    steps: Vec<Step>,
}

impl Transaction {
    pub fn new() -> Transaction {
        Transaction::default()
    }

    /// Adds an insertion step.
    pub fn insert(mut self, pos: usize, node: Node) -> Transaction {
        self.steps.push(Step::Insert { pos, node });
        self
    }

    /// Adds a deletion step.
    pub fn delete(mut self, from: usize, to: usize) -> Transaction {
        self.steps.push(Step::Delete { from, to });
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Applies every step in order to `doc`, returning the new
    /// document. The input is never modified.
    pub fn apply_to(&self, doc: &Node, schema: &Schema) -> Result<Node, TransformError> {
        let mut doc = doc.clone();
        for step in &self.steps {
            doc = match step {
                Step::Insert { pos, node } => {
                    let top_is_leaf = doc.is_text()
                        || schema
                            .node_type(&doc.name)
                            .map(|node_type| node_type.is_leaf())
                            .unwrap_or(false);
                    if top_is_leaf {
                        return Err(TransformError::CannotInsert(doc.name.clone()));
                    }
                    let pos = (*pos).min(doc.content_size(schema));
                    insert_into(schema, &doc, pos, node.clone())
                }
                Step::Delete { from, to } => {
                    let size = doc.content_size(schema);
                    let (from, to) = ((*from).min(size), (*to).min(size));
                    if from > to {
                        return Err(TransformError::InvertedRange { from, to });
                    }
                    delete_range(schema, &doc, from, to)
                }
            };
        }
        Ok(doc)
    }
}

// Replaces `remove` children starting at `index` with `nodes`.
fn with_spliced(parent: &Node, index: usize, remove: usize, nodes: Vec<Node>) -> Node {
    let mut content = parent.content.clone();
    content.splice(index..index + remove, nodes);
    Node {
        content,
        ..parent.clone()
    }
}

fn insert_into(schema: &Schema, parent: &Node, pos: usize, node: Node) -> Node {
    let mut offset = 0usize;
    for (index, child) in parent.content.iter().enumerate() {
        if pos == offset {
            return with_spliced(parent, index, 0, vec![node]);
        }
        let size = child.node_size(schema);
        if pos < offset + size {
            let inner = pos - offset - 1;
            let child_type = match schema.node_type(&child.name) {
                Ok(child_type) if !child.is_text() && !child_type.is_leaf() => child_type,
                // Inside a leaf or text run there is no interior to
                // enter; snap past it.
                _ => return with_spliced(parent, index + 1, 0, vec![node]),
            };
            if child_type.is_isolating() {
                let at = if inner == 0 { index } else { index + 1 };
                return with_spliced(parent, at, 0, vec![node]);
            }
            if child_type.is_textblock() {
                let content_size = child.content_size(schema);
                if inner == 0 {
                    return with_spliced(parent, index, 0, vec![node]);
                }
                if inner >= content_size {
                    return with_spliced(parent, index + 1, 0, vec![node]);
                }
                let (left, right) = split_textblock(schema, child, inner);
                return with_spliced(parent, index, 1, vec![left, node, right]);
            }
            let inner = inner.min(child.content_size(schema));
            let replaced = insert_into(schema, child, inner, node);
            return with_spliced(parent, index, 1, vec![replaced]);
        }
        offset += size;
    }
    with_spliced(parent, parent.content.len(), 0, vec![node])
}

// Splits a textblock's inline content at a content-relative position.
// Text runs split mid-string; everything else falls wholly on one
// side.
fn split_textblock(schema: &Schema, block: &Node, at: usize) -> (Node, Node) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut offset = 0usize;
    for child in &block.content {
        let size = child.node_size(schema);
        if offset + size <= at {
            left.push(child.clone());
        } else if offset >= at {
            right.push(child.clone());
        } else if let Some(text) = &child.text {
            let split_at = text
                .char_indices()
                .nth(at - offset)
                .map(|(byte, _)| byte)
                .unwrap_or(text.len());
            let (head, tail) = text.split_at(split_at);
            left.push(Node {
                text: Some(head.to_string()),
                ..child.clone()
            });
            right.push(Node {
                text: Some(tail.to_string()),
                ..child.clone()
            });
        } else {
            left.push(child.clone());
        }
        offset += size;
    }
    (
        Node {
            content: left,
            ..block.clone()
        },
        Node {
            content: right,
            ..block.clone()
        },
    )
}

fn delete_range(schema: &Schema, parent: &Node, from: usize, to: usize) -> Node {
    let mut content = Vec::new();
    let mut offset = 0usize;
    for child in &parent.content {
        let size = child.node_size(schema);
        let (start, end) = (offset, offset + size);
        offset = end;
        if end <= from || start >= to {
            content.push(child.clone());
            continue;
        }
        if from <= start && end <= to {
            continue;
        }
        if let Some(text) = &child.text {
            let kept: String = text
                .chars()
                .enumerate()
                .filter(|(i, _)| {
                    let pos = start + i;
                    pos < from || pos >= to
                })
                .map(|(_, c)| c)
                .collect();
            if !kept.is_empty() {
                content.push(Node {
                    text: Some(kept),
                    ..child.clone()
                });
            }
            continue;
        }
        let is_container = schema
            .node_type(&child.name)
            .map(|node_type| !node_type.is_leaf())
            .unwrap_or(false);
        if !is_container {
            content.push(child.clone());
            continue;
        }
        let inner_from = from.saturating_sub(start + 1);
        let inner_to = to.saturating_sub(start + 1).min(child.content_size(schema));
        if inner_from >= inner_to {
            // The range only grazes a boundary token. Boundaries go
            // away with their node or not at all.
            content.push(child.clone());
            continue;
        }
        content.push(delete_range(schema, child, inner_from, inner_to));
    }
    Node {
        content,
        ..parent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::editor_schema;
    use vellum_model::Attrs;

    fn schema() -> Schema {
        editor_schema().unwrap()
    }

    fn paragraph(schema: &Schema, text: &str) -> Node {
        let content = if text.is_empty() {
            vec![]
        } else {
            vec![schema.text(text).unwrap()]
        };
        schema
            .node("paragraph", Attrs::new(), content, vec![])
            .unwrap()
    }

    fn doc_of(schema: &Schema, children: Vec<Node>) -> Node {
        schema.node("doc", Attrs::new(), children, vec![]).unwrap()
    }

    fn rule(schema: &Schema) -> Node {
        schema
            .node("horizontal_rule", Attrs::new(), vec![], vec![])
            .unwrap()
    }

    #[test]
    fn position_one_in_front_of_a_paragraph_inserts_before_it() {
        let schema = schema();
        let doc = doc_of(&schema, vec![paragraph(&schema, "hello")]);
        let out = Transaction::new()
            .insert(1, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(out.describe(), r#"doc(horizontal_rule, paragraph("hello"))"#);
    }

    #[test]
    fn inserting_into_an_empty_document_appends() {
        let schema = schema();
        let doc = doc_of(&schema, vec![]);
        let out = Transaction::new()
            .insert(1, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(out.describe(), "doc(horizontal_rule)");
    }

    #[test]
    fn interior_positions_split_the_textblock() {
        let schema = schema();
        let doc = doc_of(&schema, vec![paragraph(&schema, "ab")]);
        // Tokens: 0 opens the paragraph, 1 is before "a", 2 is between
        // "a" and "b".
        let out = Transaction::new()
            .insert(2, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(
            out.describe(),
            r#"doc(paragraph("a"), horizontal_rule, paragraph("b"))"#
        );
    }

    #[test]
    fn positions_at_a_textblock_edge_snap_outside_it() {
        let schema = schema();
        let doc = doc_of(&schema, vec![paragraph(&schema, "ab")]);
        let before = Transaction::new()
            .insert(1, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(
            before.describe(),
            r#"doc(horizontal_rule, paragraph("ab"))"#
        );
        let after = Transaction::new()
            .insert(3, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(
            after.describe(),
            r#"doc(paragraph("ab"), horizontal_rule)"#
        );
    }

    #[test]
    fn isolating_nodes_are_not_entered() {
        let schema = schema();
        let table = schema
            .node_and_fill("table", Attrs::new(), vec![])
            .unwrap();
        let doc = doc_of(&schema, vec![table, paragraph(&schema, "x")]);

        // Position 1 sits just inside the table; the insertion snaps
        // in front of it instead of entering.
        let out = Transaction::new()
            .insert(1, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(out.content[0].name, "horizontal_rule");
        assert_eq!(out.content[1].name, "table");

        // Deeper interior positions snap past it.
        let out = Transaction::new()
            .insert(5, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(out.content[0].name, "table");
        assert_eq!(out.content[1].name, "horizontal_rule");
    }

    #[test]
    fn non_isolating_containers_are_entered() {
        let schema = schema();
        let quote = schema
            .node(
                "blockquote",
                Attrs::new(),
                vec![paragraph(&schema, "q")],
                vec![],
            )
            .unwrap();
        let doc = doc_of(&schema, vec![quote]);
        // Position 1 is inside the blockquote, before its paragraph.
        let out = Transaction::new()
            .insert(1, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(
            out.describe(),
            r#"doc(blockquote(horizontal_rule, paragraph("q")))"#
        );
    }

    #[test]
    fn out_of_range_positions_clamp_to_the_end() {
        let schema = schema();
        let doc = doc_of(&schema, vec![paragraph(&schema, "x")]);
        let out = Transaction::new()
            .insert(10_000, rule(&schema))
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(out.describe(), r#"doc(paragraph("x"), horizontal_rule)"#);
    }

    #[test]
    fn deleting_the_whole_range_empties_the_document() {
        let schema = schema();
        let doc = doc_of(
            &schema,
            vec![paragraph(&schema, "one"), rule(&schema), paragraph(&schema, "two")],
        );
        let size = doc.content_size(&schema);
        let out = Transaction::new()
            .delete(0, size)
            .apply_to(&doc, &schema)
            .unwrap();
        assert!(out.content.is_empty());
        assert_eq!(out.name, "doc");
    }

    #[test]
    fn partial_deletes_trim_text_without_merging_blocks() {
        let schema = schema();
        let doc = doc_of(
            &schema,
            vec![paragraph(&schema, "ab"), paragraph(&schema, "cd")],
        );
        // Paragraphs span 0..4 and 4..8; the range eats "b" and "c".
        let out = Transaction::new()
            .delete(2, 6)
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(out.describe(), r#"doc(paragraph("a"), paragraph("d"))"#);
    }

    #[test]
    fn delete_ranges_clamp_then_reject_inversion() {
        let schema = schema();
        let doc = doc_of(&schema, vec![paragraph(&schema, "abc")]);
        let clamped = Transaction::new()
            .delete(0, 10_000)
            .apply_to(&doc, &schema)
            .unwrap();
        assert!(clamped.content.is_empty());

        let err = Transaction::new()
            .delete(4, 2)
            .apply_to(&doc, &schema)
            .unwrap_err();
        assert!(matches!(err, TransformError::InvertedRange { from: 4, to: 2 }));
    }

    #[test]
    fn steps_apply_in_order() {
        let schema = schema();
        let doc = doc_of(&schema, vec![paragraph(&schema, "x")]);
        let out = Transaction::new()
            .insert(0, rule(&schema))
            .delete(0, 1)
            .apply_to(&doc, &schema)
            .unwrap();
        assert_eq!(out.describe(), r#"doc(paragraph("x"))"#);
    }
}
