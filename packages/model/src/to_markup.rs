//! # Node Tree to Markup
//!
//! Serialization asks each node's type for an [`OutputSpec`] and
//! realizes it as a markup element, splicing the node's serialized
//! children into the spec's content hole. Marks wrap the element they
//! apply to, lowest rank outermost, which is also the nesting order
//! the parser reproduces.
//!
//! Serialization does not consult content expressions. A tree that
//! violates its schema still renders, child for child, which is what
//! makes the stored form of a broken document inspectable.

use vellum_markup::{MarkupNode, OutputChild, OutputSpec};

use crate::error::RenderError;
use crate::node::Node;
use crate::schema::Schema;

/// Serializes a document's children.
///
/// The top node itself produces no markup, only its content does, so a
/// document maps to a sequence of elements rather than a single root.
pub fn serialize_doc(schema: &Schema, doc: &Node) -> Result<Vec<MarkupNode>, RenderError> {
    doc.content
        .iter()
        .map(|child| serialize_node(schema, child))
        .collect()
}

/// Serializes a single node, marks included.
pub fn serialize_node(schema: &Schema, node: &Node) -> Result<MarkupNode, RenderError> {
    let mut rendered = if let Some(text) = &node.text {
        MarkupNode::text(text)
    } else {
        let node_type = schema
            .node_type(&node.name)
            .map_err(|_| RenderError::UnknownNodeType(node.name.clone()))?;
        let spec = node_type
            .output_spec(node)
            .ok_or_else(|| RenderError::NoNodeRule(node.name.clone()))?;
        let children = node
            .content
            .iter()
            .map(|child| serialize_node(schema, child))
            .collect::<Result<Vec<_>, _>>()?;
        realize(spec, children, &node.name)?
    };
    for mark in node.marks.iter().rev() {
        let mark_type = schema
            .mark_type(&mark.name)
            .map_err(|_| RenderError::UnknownMarkType(mark.name.clone()))?;
        let spec = mark_type
            .output_spec(mark)
            .ok_or_else(|| RenderError::NoMarkRule(mark.name.clone()))?;
        rendered = realize(spec, vec![rendered], &mark.name)?;
    }
    Ok(rendered)
}

// Turns an output spec into an element, dropping `children` into the
// hole. Children with nowhere to go are an error rather than a silent
// loss.
fn realize(
    spec: OutputSpec,
    children: Vec<MarkupNode>,
    type_name: &str,
) -> Result<MarkupNode, RenderError> {
    let mut slot = Some(children);
    let element = realize_level(spec, &mut slot);
    match slot {
        Some(left_over) if !left_over.is_empty() => Err(RenderError::NoHole(type_name.to_string())),
        _ => Ok(element),
    }
}

fn realize_level(spec: OutputSpec, slot: &mut Option<Vec<MarkupNode>>) -> MarkupNode {
    let mut element = MarkupNode::element(spec.tag);
    for (name, value) in spec.attrs {
        element = element.with_attr(name, value);
    }
    match spec.child {
        OutputChild::None => element,
        OutputChild::Hole => match slot.take() {
            Some(children) => element.with_children(children),
            None => element,
        },
        OutputChild::Nested(inner) => {
            let nested = realize_level(*inner, slot);
            element.with_child(nested)
        }
    }
}
