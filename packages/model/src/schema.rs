//! # Schema
//!
//! A schema names the node and mark types a document may contain and
//! what shape each of them takes: attributes with optional defaults, a
//! content expression for children, structural flags, and the rules
//! for converting to and from markup.
//!
//! ## Building one
//!
//! Schemas are declared as a [`SchemaSpec`] and compiled once:
//!
//! ```
//! use vellum_model::{NodeSpec, Schema, SchemaSpec};
//!
//! let schema = Schema::compile(
//!     SchemaSpec::new()
//!         .with_node("doc", NodeSpec::new().with_content("block+"))
//!         .with_node(
//!             "paragraph",
//!             NodeSpec::new().with_content("inline*").with_group("block"),
//!         )
//!         .with_node("text", NodeSpec::new().with_group("inline")),
//! )
//! .unwrap();
//! assert_eq!(schema.top_type().name(), "doc");
//! ```
//!
//! Compilation resolves group names in content expressions to concrete
//! types and rejects contradictory declarations. The compiled
//! [`Schema`] is immutable and is meant to be built once and shared.
//!
//! ## Two construction paths
//!
//! [`Schema::node`] builds a node without looking at its children. It
//! resolves the type, applies attribute defaults, and adopts whatever
//! children it is given, valid or not. [`Schema::node_and_fill`]
//! instead treats the children as a prefix and completes them to a
//! sequence that satisfies the type's content expression, or refuses
//! with [`SchemaError::NoValidFill`]. Code that wants a guarantee must
//! choose the second path; nothing downgrades the first one to it.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

use vellum_markup::{MarkupNode, OutputSpec};

use crate::attrs::Attrs;
use crate::content::{parse_content_expr, ContentExpr, ContentTerm};
use crate::error::SchemaError;
use crate::node::{Mark, Node};

/// Produces the markup output spec for a node of some type.
pub type NodeToMarkup = Box<dyn Fn(&Node) -> OutputSpec + Send + Sync>;

/// Produces the markup output spec for a mark of some type.
pub type MarkToMarkup = Box<dyn Fn(&Mark) -> OutputSpec + Send + Sync>;

/// Extracts attributes from a matched markup element, or rejects the
/// match by returning `None`.
pub type ExtractAttrs = Box<dyn Fn(&MarkupNode) -> Option<Attrs> + Send + Sync>;

/// Decides whether a style declaration value produces a mark, and with
/// which attributes.
pub type StyleCheck = Box<dyn Fn(&str) -> Option<Attrs> + Send + Sync>;

/// Default priority for parse rules that do not set one.
pub const DEFAULT_RULE_PRIORITY: u16 = 50;

/// Declaration of a single attribute.
#[derive(Debug, Clone, Default)]
pub struct AttrSpec {
    /// Value used when construction omits the attribute. `None` makes
    /// the attribute required.
    pub default: Option<Value>,
}

/// How a matched tag rule produces attributes.
pub enum RuleAttrs {
    /// The match produces no attributes.
    None,
    /// The match always produces these attributes.
    Fixed(Attrs),
    /// The match asks a function, which may also reject it.
    Extract(ExtractAttrs),
}

/// A rule for recognizing a node or mark type in parsed markup.
pub enum ParseRule {
    /// Matches an element by tag name, with an optional required
    /// attribute written `tag[attr]`.
    Tag {
        selector: String,
        priority: u16,
        attrs: RuleAttrs,
    },
    /// Matches a style declaration on any element. Only marks may
    /// declare style rules.
    Style {
        property: String,
        value: Option<String>,
        check: Option<StyleCheck>,
    },
}

impl ParseRule {
    /// Rule matching elements by `selector`, such as `"p"` or
    /// `"img[src]"`.
    pub fn tag(selector: impl Into<String>) -> ParseRule {
        ParseRule::Tag {
            selector: selector.into(),
            priority: DEFAULT_RULE_PRIORITY,
            attrs: RuleAttrs::None,
        }
    }

    /// Rule matching a style declaration with this exact value.
    pub fn style(property: impl Into<String>, value: impl Into<String>) -> ParseRule {
        ParseRule::Style {
            property: property.into(),
            value: Some(value.into()),
            check: None,
        }
    }

    /// Rule matching a style declaration whose value `check` accepts.
    pub fn style_checked(
        property: impl Into<String>,
        check: impl Fn(&str) -> Option<Attrs> + Send + Sync + 'static,
    ) -> ParseRule {
        ParseRule::Style {
            property: property.into(),
            value: None,
            check: Some(Box::new(check)),
        }
    }

    /// Sets the rule's priority. Higher priorities are tried first.
    pub fn with_priority(mut self, value: u16) -> ParseRule {
        if let ParseRule::Tag { priority, .. } = &mut self {
            *priority = value;
        }
        self
    }

    /// Attaches fixed attributes produced on every match.
    pub fn with_attrs(mut self, fixed: Attrs) -> ParseRule {
        if let ParseRule::Tag { attrs, .. } = &mut self {
            *attrs = RuleAttrs::Fixed(fixed);
        }
        self
    }

    /// Attaches an extraction function. Returning `None` rejects the
    /// match and lets lower-priority rules have a turn.
    pub fn with_extract(
        mut self,
        extract: impl Fn(&MarkupNode) -> Option<Attrs> + Send + Sync + 'static,
    ) -> ParseRule {
        if let ParseRule::Tag { attrs, .. } = &mut self {
            *attrs = RuleAttrs::Extract(Box::new(extract));
        }
        self
    }
}

/// Declaration of a node type.
#[derive(Default)]
pub struct NodeSpec {
    content: Option<String>,
    group: Option<String>,
    inline: bool,
    attrs: Vec<(String, AttrSpec)>,
    marks: Option<String>,
    defining: bool,
    isolating: bool,
    parse_rules: Vec<ParseRule>,
    to_markup: Option<NodeToMarkup>,
}

impl NodeSpec {
    pub fn new() -> NodeSpec {
        NodeSpec::default()
    }

    /// Content expression for this type's children. Types without one
    /// are leaves.
    pub fn with_content(mut self, expr: impl Into<String>) -> NodeSpec {
        self.content = Some(expr.into());
        self
    }

    /// Space-separated group names this type belongs to.
    pub fn with_group(mut self, group: impl Into<String>) -> NodeSpec {
        self.group = Some(group.into());
        self
    }

    /// Marks this type as inline rather than block-level.
    pub fn inline(mut self) -> NodeSpec {
        self.inline = true;
        self
    }

    /// Declares an attribute with a default value.
    pub fn with_attr(mut self, name: impl Into<String>, default: Value) -> NodeSpec {
        self.attrs.push((
            name.into(),
            AttrSpec {
                default: Some(default),
            },
        ));
        self
    }

    /// Declares an attribute that must be supplied at construction.
    pub fn with_required_attr(mut self, name: impl Into<String>) -> NodeSpec {
        self.attrs.push((name.into(), AttrSpec::default()));
        self
    }

    /// Space-separated mark type names allowed on this type's inline
    /// content. The empty string allows none; leaving this unset
    /// allows every mark.
    pub fn with_marks(mut self, marks: impl Into<String>) -> NodeSpec {
        self.marks = Some(marks.into());
        self
    }

    /// Marks this type as defining its surrounding context.
    pub fn defining(mut self) -> NodeSpec {
        self.defining = true;
        self
    }

    /// Marks this type as a boundary that edits do not cross.
    pub fn isolating(mut self) -> NodeSpec {
        self.isolating = true;
        self
    }

    /// Adds a markup parse rule.
    pub fn with_parse_rule(mut self, rule: ParseRule) -> NodeSpec {
        self.parse_rules.push(rule);
        self
    }

    /// Shorthand for a plain tag rule.
    pub fn with_parse_tag(self, selector: impl Into<String>) -> NodeSpec {
        self.with_parse_rule(ParseRule::tag(selector))
    }

    /// Sets the markup output function.
    pub fn with_to_markup(
        mut self,
        to_markup: impl Fn(&Node) -> OutputSpec + Send + Sync + 'static,
    ) -> NodeSpec {
        self.to_markup = Some(Box::new(to_markup));
        self
    }
}

/// Declaration of a mark type.
pub struct MarkSpec {
    attrs: Vec<(String, AttrSpec)>,
    inclusive: bool,
    parse_rules: Vec<ParseRule>,
    to_markup: Option<MarkToMarkup>,
}

impl Default for MarkSpec {
    fn default() -> MarkSpec {
        MarkSpec {
            attrs: Vec::new(),
            inclusive: true,
            parse_rules: Vec::new(),
            to_markup: None,
        }
    }
}

impl MarkSpec {
    pub fn new() -> MarkSpec {
        MarkSpec::default()
    }

    /// Declares an attribute with a default value.
    pub fn with_attr(mut self, name: impl Into<String>, default: Value) -> MarkSpec {
        self.attrs.push((
            name.into(),
            AttrSpec {
                default: Some(default),
            },
        ));
        self
    }

    /// Declares an attribute that must be supplied at construction.
    pub fn with_required_attr(mut self, name: impl Into<String>) -> MarkSpec {
        self.attrs.push((name.into(), AttrSpec::default()));
        self
    }

    /// Whether the mark extends to content typed at its end. On by
    /// default.
    pub fn with_inclusive(mut self, inclusive: bool) -> MarkSpec {
        self.inclusive = inclusive;
        self
    }

    /// Adds a markup parse rule.
    pub fn with_parse_rule(mut self, rule: ParseRule) -> MarkSpec {
        self.parse_rules.push(rule);
        self
    }

    /// Shorthand for a plain tag rule.
    pub fn with_parse_tag(self, selector: impl Into<String>) -> MarkSpec {
        self.with_parse_rule(ParseRule::tag(selector))
    }

    /// Sets the markup output function.
    pub fn with_to_markup(
        mut self,
        to_markup: impl Fn(&Mark) -> OutputSpec + Send + Sync + 'static,
    ) -> MarkSpec {
        self.to_markup = Some(Box::new(to_markup));
        self
    }
}

/// Declaration of a whole schema: node types, mark types and the top
/// node, all in the order given.
///
/// Declaration order is meaningful twice over: it decides which type
/// fills a group term when content is generated, and it decides mark
/// nesting when marks are serialized.
#[derive(Default)]
pub struct SchemaSpec {
    nodes: Vec<(String, NodeSpec)>,
    marks: Vec<(String, MarkSpec)>,
    top: Option<String>,
}

impl SchemaSpec {
    pub fn new() -> SchemaSpec {
        SchemaSpec::default()
    }

    /// Declares a node type.
    pub fn with_node(mut self, name: impl Into<String>, spec: NodeSpec) -> SchemaSpec {
        self.nodes.push((name.into(), spec));
        self
    }

    /// Declares a mark type. Rank follows declaration order.
    pub fn with_mark(mut self, name: impl Into<String>, spec: MarkSpec) -> SchemaSpec {
        self.marks.push((name.into(), spec));
        self
    }

    /// Names the document's top node type. Defaults to `doc`.
    pub fn with_top_node(mut self, name: impl Into<String>) -> SchemaSpec {
        self.top = Some(name.into());
        self
    }
}

/// A compiled node type.
pub struct NodeType {
    name: String,
    index: usize,
    content: Option<ContentExpr>,
    inline: bool,
    inline_content: bool,
    text: bool,
    groups: Vec<String>,
    attrs: Vec<(String, AttrSpec)>,
    allowed_marks: Option<Vec<String>>,
    defining: bool,
    isolating: bool,
    to_markup: Option<NodeToMarkup>,
}

impl NodeType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of this type in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether this type has no content expression and spans a single
    /// position token.
    pub fn is_leaf(&self) -> bool {
        self.content.is_none()
    }

    pub fn is_text(&self) -> bool {
        self.text
    }

    pub fn is_inline(&self) -> bool {
        self.inline
    }

    /// Whether this is a block node holding inline content, such as a
    /// paragraph or a table cell.
    pub fn is_textblock(&self) -> bool {
        !self.inline && self.inline_content
    }

    pub fn is_defining(&self) -> bool {
        self.defining
    }

    pub fn is_isolating(&self) -> bool {
        self.isolating
    }

    /// Source text of the content expression, if the type has one.
    pub fn content_source(&self) -> Option<&str> {
        self.content.as_ref().map(|expr| expr.source.as_str())
    }

    /// Groups this type belongs to.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Whether inline content of this type may carry the named mark.
    pub fn allows_mark_name(&self, mark: &str) -> bool {
        match &self.allowed_marks {
            None => true,
            Some(allowed) => allowed.iter().any(|name| name == mark),
        }
    }

    /// Resolves given attributes against the declarations: declared
    /// defaults fill gaps, missing required attributes are an error,
    /// and keys the type does not declare are dropped.
    pub fn compute_attrs(&self, given: Attrs) -> Result<Attrs, SchemaError> {
        compute_attrs(&self.name, &self.attrs, given)
    }

    pub(crate) fn content_expr(&self) -> Option<&ContentExpr> {
        self.content.as_ref()
    }

    pub(crate) fn attr_specs(&self) -> &[(String, AttrSpec)] {
        &self.attrs
    }

    pub(crate) fn output_spec(&self, node: &Node) -> Option<OutputSpec> {
        self.to_markup.as_ref().map(|to_markup| to_markup(node))
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeType({})", self.name)
    }
}

/// A compiled mark type.
pub struct MarkType {
    name: String,
    rank: usize,
    attrs: Vec<(String, AttrSpec)>,
    inclusive: bool,
    to_markup: Option<MarkToMarkup>,
}

impl MarkType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of this type in declaration order. Lower ranks nest
    /// outside higher ones when marks are serialized.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    /// See [`NodeType::compute_attrs`].
    pub fn compute_attrs(&self, given: Attrs) -> Result<Attrs, SchemaError> {
        compute_attrs(&self.name, &self.attrs, given)
    }

    pub(crate) fn output_spec(&self, mark: &Mark) -> Option<OutputSpec> {
        self.to_markup.as_ref().map(|to_markup| to_markup(mark))
    }
}

impl fmt::Debug for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkType({})", self.name)
    }
}

fn compute_attrs(
    owner: &str,
    specs: &[(String, AttrSpec)],
    given: Attrs,
) -> Result<Attrs, SchemaError> {
    let mut out = Attrs::new();
    for (attr_name, attr_spec) in specs {
        match given.get(attr_name).or(attr_spec.default.as_ref()) {
            Some(value) => {
                out.insert(attr_name.clone(), value.clone());
            }
            None => {
                return Err(SchemaError::MissingAttr {
                    name: owner.to_string(),
                    attr: attr_name.clone(),
                })
            }
        }
    }
    Ok(out)
}

/// A tag rule flattened into the schema-wide, priority-ordered table.
pub(crate) struct TagRule {
    pub tag: String,
    pub required_attr: Option<String>,
    pub attrs: RuleAttrs,
    pub target: RuleTarget,
}

/// A style rule flattened into the schema-wide table. Style rules only
/// target marks.
pub(crate) struct StyleRule {
    pub property: String,
    pub value: Option<String>,
    pub check: Option<StyleCheck>,
    pub mark: String,
}

#[derive(Debug, Clone)]
pub(crate) enum RuleTarget {
    Node(String),
    Mark(String),
}

/// A compiled schema. Immutable once built; clone the [`std::sync::Arc`]
/// it usually lives behind rather than the schema itself.
pub struct Schema {
    nodes: IndexMap<String, NodeType>,
    marks: IndexMap<String, MarkType>,
    top: String,
    pub(crate) tag_rules: Vec<TagRule>,
    pub(crate) style_rules: Vec<StyleRule>,
}

impl Schema {
    /// Compiles a spec, resolving content expressions and validating
    /// every cross-reference.
    pub fn compile(spec: SchemaSpec) -> Result<Schema, SchemaError> {
        let SchemaSpec { nodes, marks, top } = spec;

        let mut mark_table: IndexMap<String, MarkType> = IndexMap::with_capacity(marks.len());
        let mut mark_rules: Vec<(String, ParseRule)> = Vec::new();
        for (rank, (name, mark_spec)) in marks.into_iter().enumerate() {
            if mark_table.contains_key(&name) {
                return Err(SchemaError::DuplicateMarkType(name));
            }
            for rule in mark_spec.parse_rules {
                mark_rules.push((name.clone(), rule));
            }
            mark_table.insert(
                name.clone(),
                MarkType {
                    name,
                    rank,
                    attrs: mark_spec.attrs,
                    inclusive: mark_spec.inclusive,
                    to_markup: mark_spec.to_markup,
                },
            );
        }

        // First node pass: membership tables, so group names in content
        // expressions can be resolved in the second pass.
        let mut by_name: IndexMap<String, usize> = IndexMap::with_capacity(nodes.len());
        for (index, (name, _)) in nodes.iter().enumerate() {
            if by_name.insert(name.clone(), index).is_some() {
                return Err(SchemaError::DuplicateNodeType(name.clone()));
            }
        }
        let groups_of = |spec: &NodeSpec| -> Vec<String> {
            spec.group
                .as_deref()
                .unwrap_or("")
                .split_whitespace()
                .map(str::to_string)
                .collect()
        };
        let mut in_group: std::collections::HashMap<String, Vec<usize>> =
            std::collections::HashMap::new();
        for (index, (_, node_spec)) in nodes.iter().enumerate() {
            for group in groups_of(node_spec) {
                in_group.entry(group).or_default().push(index);
            }
        }
        let inline_flags: Vec<bool> = nodes
            .iter()
            .map(|(name, node_spec)| node_spec.inline || name == "text")
            .collect();

        let mut node_table: IndexMap<String, NodeType> = IndexMap::with_capacity(nodes.len());
        let mut node_rules: Vec<(String, ParseRule)> = Vec::new();
        for (index, (name, node_spec)) in nodes.into_iter().enumerate() {
            let text = name == "text";
            if text && (!node_spec.attrs.is_empty() || node_spec.content.is_some()) {
                return Err(SchemaError::InvalidTextType);
            }
            let groups = groups_of(&node_spec);
            let content = match &node_spec.content {
                None => None,
                Some(source) => Some(resolve_expr(source, &by_name, &in_group)?),
            };
            let inline_content = match &content {
                None => false,
                Some(expr) => expr_inline_content(expr, &inline_flags)?,
            };
            let allowed_marks = match &node_spec.marks {
                None => None,
                Some(names) => {
                    let mut allowed = Vec::new();
                    for mark_name in names.split_whitespace() {
                        if !mark_table.contains_key(mark_name) {
                            return Err(SchemaError::UnknownMarkType(mark_name.to_string()));
                        }
                        allowed.push(mark_name.to_string());
                    }
                    Some(allowed)
                }
            };
            for rule in node_spec.parse_rules {
                if matches!(rule, ParseRule::Style { .. }) {
                    return Err(SchemaError::StyleRuleOnNode(name.clone()));
                }
                node_rules.push((name.clone(), rule));
            }
            node_table.insert(
                name.clone(),
                NodeType {
                    name,
                    index,
                    content,
                    inline: inline_flags[index],
                    inline_content,
                    text,
                    groups,
                    attrs: node_spec.attrs,
                    allowed_marks,
                    defining: node_spec.defining,
                    isolating: node_spec.isolating,
                    to_markup: node_spec.to_markup,
                },
            );
        }

        let top = top.unwrap_or_else(|| "doc".to_string());
        if !node_table.contains_key(&top) {
            return Err(SchemaError::MissingTopNode(top));
        }

        let mut tag_rules: Vec<(u16, TagRule)> = Vec::new();
        let mut style_rules: Vec<StyleRule> = Vec::new();
        let targeted = node_rules
            .into_iter()
            .map(|(name, rule)| (RuleTarget::Node(name), rule))
            .chain(
                mark_rules
                    .into_iter()
                    .map(|(name, rule)| (RuleTarget::Mark(name), rule)),
            );
        for (target, rule) in targeted {
            match rule {
                ParseRule::Tag {
                    selector,
                    priority,
                    attrs,
                } => {
                    let (tag, required_attr) = parse_selector(&selector)?;
                    tag_rules.push((
                        priority,
                        TagRule {
                            tag,
                            required_attr,
                            attrs,
                            target,
                        },
                    ));
                }
                ParseRule::Style {
                    property,
                    value,
                    check,
                } => {
                    let mark = match target {
                        RuleTarget::Mark(name) => name,
                        // Style rules on nodes were rejected above.
                        RuleTarget::Node(name) => return Err(SchemaError::StyleRuleOnNode(name)),
                    };
                    style_rules.push(StyleRule {
                        property,
                        value,
                        check,
                        mark,
                    });
                }
            }
        }
        // Stable, so rules with equal priority keep declaration order.
        tag_rules.sort_by_key(|(priority, _)| std::cmp::Reverse(*priority));

        Ok(Schema {
            nodes: node_table,
            marks: mark_table,
            top,
            tag_rules: tag_rules.into_iter().map(|(_, rule)| rule).collect(),
            style_rules,
        })
    }

    /// Looks up a node type by name.
    pub fn node_type(&self, name: &str) -> Result<&NodeType, SchemaError> {
        self.nodes
            .get(name)
            .ok_or_else(|| SchemaError::UnknownNodeType(name.to_string()))
    }

    /// Looks up a mark type by name.
    pub fn mark_type(&self, name: &str) -> Result<&MarkType, SchemaError> {
        self.marks
            .get(name)
            .ok_or_else(|| SchemaError::UnknownMarkType(name.to_string()))
    }

    /// Rank of the named mark type, if the schema has it.
    pub fn mark_rank(&self, name: &str) -> Option<usize> {
        self.marks.get(name).map(MarkType::rank)
    }

    /// The document's top node type.
    pub fn top_type(&self) -> &NodeType {
        &self.nodes[&self.top]
    }

    /// Node type names in declaration order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Mark type names in rank order.
    pub fn mark_names(&self) -> impl Iterator<Item = &str> {
        self.marks.keys().map(String::as_str)
    }

    pub(crate) fn node_type_at(&self, index: usize) -> Option<&NodeType> {
        self.nodes.get_index(index).map(|(_, node_type)| node_type)
    }

    /// Builds a node of the named type without validating its content.
    ///
    /// The type must exist and required attributes must be supplied;
    /// beyond that, the given children and marks are adopted verbatim.
    /// A sequence of children that violates the type's content
    /// expression is preserved, not repaired and not rejected. Use
    /// [`Node::check`] or [`Node::violations`] to find out after the
    /// fact, or [`Schema::node_and_fill`] to get a validated tree.
    pub fn node(
        &self,
        name: &str,
        attrs: Attrs,
        content: Vec<Node>,
        marks: Vec<Mark>,
    ) -> Result<Node, SchemaError> {
        let node_type = self.node_type(name)?;
        if node_type.is_text() {
            return Err(SchemaError::TextViaNode);
        }
        let attrs = node_type.compute_attrs(attrs)?;
        Ok(Node {
            name: node_type.name.clone(),
            attrs,
            content,
            marks,
            text: None,
        })
    }

    /// Builds a text node.
    pub fn text(&self, text: impl Into<String>) -> Result<Node, SchemaError> {
        self.text_with_marks(text, Vec::new())
    }

    /// Builds a text node carrying marks.
    pub fn text_with_marks(
        &self,
        text: impl Into<String>,
        marks: Vec<Mark>,
    ) -> Result<Node, SchemaError> {
        let node_type = self
            .nodes
            .values()
            .find(|node_type| node_type.is_text())
            .ok_or(SchemaError::NoTextType)?;
        Ok(Node {
            name: node_type.name.clone(),
            attrs: Attrs::new(),
            content: Vec::new(),
            marks,
            text: Some(text.into()),
        })
    }

    /// Builds a mark of the named type, applying attribute defaults.
    pub fn mark(&self, name: &str, attrs: Attrs) -> Result<Mark, SchemaError> {
        let mark_type = self.mark_type(name)?;
        let attrs = mark_type.compute_attrs(attrs)?;
        Ok(Mark {
            name: mark_type.name.clone(),
            attrs,
        })
    }

    /// Builds a node of the named type and completes `prefix` into
    /// content that satisfies the type's content expression.
    ///
    /// The prefix is kept in order and in full; missing children are
    /// generated from the first declared type that can be built out of
    /// defaults, recursively filled to its own minimal valid content.
    /// When no completion exists the whole construction fails with
    /// [`SchemaError::NoValidFill`].
    pub fn node_and_fill(
        &self,
        name: &str,
        attrs: Attrs,
        prefix: Vec<Node>,
    ) -> Result<Node, SchemaError> {
        let node_type = self.node_type(name)?;
        if node_type.is_text() {
            return Err(SchemaError::TextViaNode);
        }
        let attrs = node_type.compute_attrs(attrs)?;
        let expr = match node_type.content_expr() {
            None if prefix.is_empty() => {
                return Ok(Node {
                    name: node_type.name.clone(),
                    attrs,
                    content: Vec::new(),
                    marks: Vec::new(),
                    text: None,
                });
            }
            None => return Err(SchemaError::LeafWithChildren(name.to_string())),
            Some(expr) => expr,
        };
        let prefix_types = self.resolve_children(&prefix)?;
        let mut stack = vec![node_type.index];
        match self.fill_from(expr, 0, &prefix, &prefix_types, 0, &mut stack) {
            Some(content) => Ok(Node {
                name: node_type.name.clone(),
                attrs,
                content,
                marks: Vec::new(),
                text: None,
            }),
            None => {
                tracing::debug!(name, expr = %expr.source, "no valid fill");
                Err(SchemaError::NoValidFill {
                    name: name.to_string(),
                    expr: expr.source.clone(),
                })
            }
        }
    }

    /// Whether `children` would be valid content for the named type.
    ///
    /// Purely observational. Errors only when the parent type or a
    /// child's type is not part of this schema at all.
    pub fn valid_content(&self, name: &str, children: &[Node]) -> Result<bool, SchemaError> {
        let node_type = self.node_type(name)?;
        let expr = match node_type.content_expr() {
            None => return Ok(children.is_empty()),
            Some(expr) => expr,
        };
        let child_types = self.resolve_children(children)?;
        Ok(expr.matches(&child_types))
    }

    /// Rebuilds a node tree from its serialized JSON value.
    ///
    /// Types and marks are resolved against this schema and attribute
    /// defaults reapplied, but content is adopted unchecked, so a
    /// stored document that violates its content expressions comes
    /// back exactly as it went in.
    pub fn node_from_value(&self, value: &Value) -> Result<Node, SchemaError> {
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::MalformedNode("node value is not an object".to_string()))?;
        let name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::MalformedNode("node value has no type".to_string()))?;
        let node_type = self.node_type(name)?;

        let mut marks = Vec::new();
        if let Some(raw_marks) = object.get("marks") {
            let items = raw_marks.as_array().ok_or_else(|| {
                SchemaError::MalformedNode(format!("marks of {} is not an array", name))
            })?;
            for item in items {
                marks.push(self.mark_from_value(item)?);
            }
        }

        if node_type.is_text() {
            let text = object.get("text").and_then(Value::as_str).ok_or_else(|| {
                SchemaError::MalformedNode("text node without a text value".to_string())
            })?;
            return self.text_with_marks(text, marks);
        }

        let attrs = match object.get("attrs") {
            None => Attrs::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(SchemaError::MalformedNode(format!(
                    "attrs of {} is not an object",
                    name
                )))
            }
        };
        let mut content = Vec::new();
        if let Some(raw_content) = object.get("content") {
            let items = raw_content.as_array().ok_or_else(|| {
                SchemaError::MalformedNode(format!("content of {} is not an array", name))
            })?;
            for item in items {
                content.push(self.node_from_value(item)?);
            }
        }
        self.node(name, attrs, content, marks)
    }

    fn mark_from_value(&self, value: &Value) -> Result<Mark, SchemaError> {
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::MalformedNode("mark value is not an object".to_string()))?;
        let name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::MalformedNode("mark value has no type".to_string()))?;
        let attrs = match object.get("attrs") {
            None => Attrs::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(SchemaError::MalformedNode(format!(
                    "attrs of mark {} is not an object",
                    name
                )))
            }
        };
        self.mark(name, attrs)
    }

    fn resolve_children(&self, children: &[Node]) -> Result<Vec<usize>, SchemaError> {
        children
            .iter()
            .map(|child| self.node_type(&child.name).map(NodeType::index))
            .collect()
    }

    // Assigns prefix children to terms left to right, topping each
    // term up to its minimum with generated nodes. Greedy on the
    // prefix, backing off one child at a time when later terms cannot
    // finish.
    fn fill_from(
        &self,
        expr: &ContentExpr,
        term_index: usize,
        prefix: &[Node],
        prefix_types: &[usize],
        child_index: usize,
        stack: &mut Vec<usize>,
    ) -> Option<Vec<Node>> {
        if term_index == expr.terms.len() {
            return (child_index == prefix.len()).then(Vec::new);
        }
        let term = &expr.terms[term_index];
        let mut can_take = 0usize;
        while child_index + can_take < prefix.len()
            && (can_take as u32) < term.max
            && term.types.contains(&prefix_types[child_index + can_take])
        {
            can_take += 1;
        }
        for take in (0..=can_take).rev() {
            let needed = (term.min as usize).saturating_sub(take);
            let generated = if needed == 0 {
                Vec::new()
            } else {
                match self.generate_for_term(term, needed, stack) {
                    Some(generated) => generated,
                    None => continue,
                }
            };
            if let Some(rest) = self.fill_from(
                expr,
                term_index + 1,
                prefix,
                prefix_types,
                child_index + take,
                stack,
            ) {
                let mut out: Vec<Node> = prefix[child_index..child_index + take].to_vec();
                out.extend(generated);
                out.extend(rest);
                return Some(out);
            }
        }
        None
    }

    fn generate_for_term(
        &self,
        term: &ContentTerm,
        needed: usize,
        stack: &mut Vec<usize>,
    ) -> Option<Vec<Node>> {
        for &type_index in &term.types {
            if let Some(node) = self.generate_node(type_index, stack) {
                return Some((0..needed).map(|_| node.clone()).collect());
            }
        }
        None
    }

    // A type is generatable when every attribute has a default, it is
    // not text, and its own content can be filled from nothing. The
    // stack breaks generation cycles between mutually recursive types.
    fn generate_node(&self, type_index: usize, stack: &mut Vec<usize>) -> Option<Node> {
        if stack.contains(&type_index) {
            return None;
        }
        let node_type = self.node_type_at(type_index)?;
        if node_type.is_text() {
            return None;
        }
        let mut attrs = Attrs::new();
        for (attr_name, attr_spec) in node_type.attr_specs() {
            attrs.insert(attr_name.clone(), attr_spec.default.clone()?);
        }
        let content = match node_type.content_expr() {
            None => Vec::new(),
            Some(expr) => {
                stack.push(type_index);
                let filled = self.fill_from(expr, 0, &[], &[], 0, stack);
                stack.pop();
                filled?
            }
        };
        Some(Node {
            name: node_type.name.clone(),
            attrs,
            content,
            marks: Vec::new(),
            text: None,
        })
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("marks", &self.marks.keys().collect::<Vec<_>>())
            .field("top", &self.top)
            .finish()
    }
}

fn parse_selector(selector: &str) -> Result<(String, Option<String>), SchemaError> {
    let valid_name =
        |name: &str| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    match selector.split_once('[') {
        None => {
            if !valid_name(selector) {
                return Err(SchemaError::InvalidSelector(selector.to_string()));
            }
            Ok((selector.to_string(), None))
        }
        Some((tag, rest)) => {
            let attr = rest
                .strip_suffix(']')
                .filter(|attr| valid_name(attr) && valid_name(tag))
                .ok_or_else(|| SchemaError::InvalidSelector(selector.to_string()))?;
            Ok((tag.to_string(), Some(attr.to_string())))
        }
    }
}

fn resolve_expr(
    source: &str,
    by_name: &IndexMap<String, usize>,
    in_group: &std::collections::HashMap<String, Vec<usize>>,
) -> Result<ContentExpr, SchemaError> {
    let mut terms = Vec::new();
    for raw in parse_content_expr(source)? {
        let types = match by_name.get(&raw.name) {
            Some(&index) => vec![index],
            None => in_group.get(&raw.name).cloned().ok_or_else(|| {
                SchemaError::UnknownContentName(raw.name.clone(), source.to_string())
            })?,
        };
        terms.push(ContentTerm {
            types,
            min: raw.min,
            max: raw.max,
        });
    }
    Ok(ContentExpr {
        source: source.to_string(),
        terms,
    })
}

fn expr_inline_content(expr: &ContentExpr, inline_flags: &[bool]) -> Result<bool, SchemaError> {
    let mut any_inline = false;
    let mut any_block = false;
    for term in &expr.terms {
        for &type_index in &term.types {
            if inline_flags[type_index] {
                any_inline = true;
            } else {
                any_block = true;
            }
        }
    }
    if any_inline && any_block {
        return Err(SchemaError::MixedContent(expr.source.clone()));
    }
    Ok(any_inline)
}
