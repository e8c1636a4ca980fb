//! Error types for schema compilation, node construction and markup
//! conversion

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Unknown mark type: {0}")]
    UnknownMarkType(String),

    #[error("Duplicate node type: {0}")]
    DuplicateNodeType(String),

    #[error("Duplicate mark type: {0}")]
    DuplicateMarkType(String),

    #[error("No node type named {0:?} and no group matches it in content expression {1:?}")]
    UnknownContentName(String, String),

    #[error("Invalid content expression {expr:?}: {detail}")]
    ContentExpr { expr: String, detail: String },

    #[error("Content expression {0:?} mixes inline and block types")]
    MixedContent(String),

    #[error("Invalid parse selector {0:?}")]
    InvalidSelector(String),

    #[error("Schema is missing a top node type named {0:?}")]
    MissingTopNode(String),

    #[error("Schema has no text type")]
    NoTextType,

    #[error("The text type may not declare attributes or a content expression")]
    InvalidTextType,

    #[error("Style parse rules are only supported on marks, found one on node type {0}")]
    StyleRuleOnNode(String),

    #[error("No value supplied for required attribute {attr} of {name}")]
    MissingAttr { name: String, attr: String },

    #[error("Text nodes are created with Schema::text, not with node constructors")]
    TextViaNode,

    #[error("Node type {0} is a leaf and cannot be filled with children")]
    LeafWithChildren(String),

    #[error("Cannot fill content of {name} to satisfy {expr:?}")]
    NoValidFill { name: String, expr: String },

    #[error("Malformed node value: {0}")]
    MalformedNode(String),

    #[error("Invalid content at {at}: {message}")]
    InvalidContent { at: String, message: String },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot render unknown node type {0}")]
    UnknownNodeType(String),

    #[error("Cannot render unknown mark type {0}")]
    UnknownMarkType(String),

    #[error("No markup output rule for node type {0}")]
    NoNodeRule(String),

    #[error("No markup output rule for mark type {0}")]
    NoMarkRule(String),

    #[error("Output spec for {0} has no content hole but the node has children")]
    NoHole(String),
}
