//! # Vellum Model
//!
//! The document model: typed trees of nodes and marks, the schemas
//! that describe them, and the conversions between trees and markup.
//!
//! ## Architecture
//!
//! ```text
//! SchemaSpec ──compile──▶ Schema
//!                           │
//!          ┌────────────────┼──────────────────┐
//!          ▼                ▼                  ▼
//!     Schema::node    Schema::node_and_fill   parse_doc / serialize_doc
//!     (unchecked)     (validated or error)    (markup conversion)
//!          │                │
//!          └───────┬────────┘
//!                  ▼
//!                Node  ──serde──▶ stored JSON
//! ```
//!
//! The load-bearing asymmetry: [`Schema::node`] resolves the type and
//! attributes but adopts children verbatim, while
//! [`Schema::node_and_fill`] completes children into content that
//! satisfies the type's content expression or fails. Validity is
//! something callers opt into, per construction site, and
//! [`Node::check`] / [`Node::violations`] exist to observe the
//! consequences.

pub mod attrs;
mod content;
pub mod error;
pub mod from_markup;
pub mod node;
pub mod schema;
pub mod to_markup;

pub use attrs::{attrs, Attrs};
pub use error::{RenderError, SchemaError};
pub use from_markup::parse_doc;
pub use node::{ContentViolation, Mark, Node};
pub use schema::{
    AttrSpec, ExtractAttrs, MarkSpec, MarkToMarkup, MarkType, NodeSpec, NodeToMarkup, NodeType,
    ParseRule, RuleAttrs, Schema, SchemaSpec, StyleCheck, DEFAULT_RULE_PRIORITY,
};
pub use to_markup::{serialize_doc, serialize_node};
