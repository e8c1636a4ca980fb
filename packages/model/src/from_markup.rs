//! # Markup to Node Tree
//!
//! Parsing turns a markup tree back into a document by running every
//! element through the schema's parse rules:
//!
//! * tag rules are tried in priority order (then declaration order);
//!   the first whose selector matches and whose extraction function
//!   does not reject wins,
//! * a rule targeting a node type produces a node and parses the
//!   element's children as its content,
//! * a rule targeting a mark type adds the mark to the active set and
//!   splices the element's children into the surrounding content,
//! * style rules add marks based on the element's inline `style`
//!   declarations, independently of how the element itself is handled,
//! * an element no rule claims is transparent: it disappears and its
//!   children are parsed in its place.
//!
//! Marks a parent type does not allow are silently dropped from its
//! inline content, and adjacent text nodes with equal mark sets merge.
//! Content expressions are not enforced here; the tree that comes back
//! says what the markup said.

use vellum_markup::MarkupNode;

use crate::attrs::Attrs;
use crate::error::SchemaError;
use crate::node::{Mark, Node};
use crate::schema::{NodeType, RuleAttrs, RuleTarget, Schema};

/// Parses a markup fragment into a document rooted at the schema's top
/// node type.
pub fn parse_doc(schema: &Schema, markup: &[MarkupNode]) -> Result<Node, SchemaError> {
    let top = schema.top_type();
    let mut children = Vec::new();
    parse_nodes(schema, markup, top, &[], &mut children)?;
    schema.node(top.name(), Attrs::new(), children, Vec::new())
}

fn parse_nodes(
    schema: &Schema,
    markup: &[MarkupNode],
    parent: &NodeType,
    marks: &[Mark],
    out: &mut Vec<Node>,
) -> Result<(), SchemaError> {
    for item in markup {
        match item {
            MarkupNode::Text { content } => {
                if content.is_empty() {
                    continue;
                }
                let kept = allowed_marks(parent, marks);
                if let Some(last) = out.last_mut() {
                    if last.is_text() && last.marks == kept {
                        if let Some(text) = last.text.as_mut() {
                            text.push_str(content);
                            continue;
                        }
                    }
                }
                out.push(schema.text_with_marks(content.as_str(), kept)?);
            }
            MarkupNode::Element { tag, children, .. } => {
                let element = item;
                let mut active = marks.to_vec();
                for rule in &schema.style_rules {
                    let Some(value) = element.style_value(&rule.property) else {
                        continue;
                    };
                    let matched = match (&rule.value, &rule.check) {
                        (Some(expected), _) => (value == expected.as_str()).then(Attrs::new),
                        (None, Some(check)) => check(value),
                        (None, None) => Some(Attrs::new()),
                    };
                    let Some(mark_attrs) = matched else { continue };
                    let mark = schema.mark(&rule.mark, mark_attrs)?;
                    active = mark.add_to_set(&active, schema);
                }

                let mut handled = false;
                for rule in &schema.tag_rules {
                    if rule.tag != *tag {
                        continue;
                    }
                    if let Some(required) = &rule.required_attr {
                        if !element.has_attr(required) {
                            continue;
                        }
                    }
                    let rule_attrs = match &rule.attrs {
                        RuleAttrs::None => Attrs::new(),
                        RuleAttrs::Fixed(fixed) => fixed.clone(),
                        RuleAttrs::Extract(extract) => match extract(element) {
                            Some(extracted) => extracted,
                            None => continue,
                        },
                    };
                    match &rule.target {
                        RuleTarget::Node(name) => {
                            let node_type = schema.node_type(name)?;
                            if node_type.is_text() {
                                continue;
                            }
                            let mut node_children = Vec::new();
                            if !node_type.is_leaf() {
                                parse_nodes(
                                    schema,
                                    element.children(),
                                    node_type,
                                    &active,
                                    &mut node_children,
                                )?;
                            }
                            let node_marks = if node_type.is_inline() {
                                allowed_marks(parent, &active)
                            } else {
                                Vec::new()
                            };
                            out.push(schema.node(name, rule_attrs, node_children, node_marks)?);
                        }
                        RuleTarget::Mark(name) => {
                            let mark = schema.mark(name, rule_attrs)?;
                            let extended = mark.add_to_set(&active, schema);
                            parse_nodes(schema, element.children(), parent, &extended, out)?;
                        }
                    }
                    handled = true;
                    break;
                }
                if !handled {
                    tracing::trace!(tag = %tag, "no parse rule matched, element is transparent");
                    parse_nodes(schema, children, parent, &active, out)?;
                }
            }
        }
    }
    Ok(())
}

fn allowed_marks(parent: &NodeType, marks: &[Mark]) -> Vec<Mark> {
    marks
        .iter()
        .filter(|mark| parent.allows_mark_name(&mark.name))
        .cloned()
        .collect()
}
