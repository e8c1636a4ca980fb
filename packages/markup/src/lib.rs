//! # Vellum Markup
//!
//! The generic markup tree that documents are serialized to and parsed from.
//!
//! This crate knows nothing about schemas or document semantics. It provides:
//! - [`MarkupNode`], an HTML-shaped value tree (elements with ordered
//!   attributes, text)
//! - [`OutputSpec`], the serialization template a schema type produces for
//!   one node (tag, computed attributes, child slot)
//! - [`render_html`], pretty-printed HTML rendering of a markup tree
//!
//! The conversion between documents and markup lives in `vellum-model`,
//! layered on top of these types.

mod output;
mod render;
mod tree;

pub use output::{OutputChild, OutputSpec};
pub use render::{render_html, render_html_fragment};
pub use tree::MarkupNode;
