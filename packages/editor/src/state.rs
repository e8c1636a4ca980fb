//! # Editor State
//!
//! An [`EditorState`] is a schema plus the current document. States
//! change by applying [`Transaction`]s, and serialize to the JSON
//! envelope the store persists.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use vellum_model::{Node, Schema};

use crate::error::EditorError;
use crate::transaction::Transaction;

/// The persisted form of an editor state. One field today, but stored
/// documents stay readable if more state ever travels along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedState {
    pub doc: serde_json::Value,
}

/// The current document and the schema it was built against.
pub struct EditorState {
    pub schema: Arc<Schema>,
    pub doc: Node,
    version: u64,
}

impl EditorState {
    /// Creates a state holding the schema's minimal valid document,
    /// the filled top node.
    pub fn new(schema: Arc<Schema>) -> Result<EditorState, EditorError> {
        let top = schema.top_type().name().to_string();
        let doc = schema.node_and_fill(&top, vellum_model::Attrs::new(), vec![])?;
        Ok(EditorState::with_doc(schema, doc))
    }

    /// Creates a state around an existing document, as hydration does.
    /// The document is taken as-is; nothing checks it against the
    /// schema here.
    pub fn with_doc(schema: Arc<Schema>, doc: Node) -> EditorState {
        EditorState {
            schema,
            doc,
            version: 0,
        }
    }

    /// Number of transactions applied to this state.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Applies a transaction, replacing the document.
    pub fn apply(&mut self, transaction: Transaction) -> Result<(), EditorError> {
        self.doc = transaction.apply_to(&self.doc, &self.schema)?;
        self.version += 1;
        tracing::debug!(version = self.version, "transaction applied");
        Ok(())
    }

    /// The serialized form of this state.
    pub fn serialize(&self) -> Result<SerializedState, EditorError> {
        Ok(SerializedState {
            doc: serde_json::to_value(&self.doc)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::editor_schema;

    #[test]
    fn new_state_holds_the_filled_top_node() {
        let schema = Arc::new(editor_schema().unwrap());
        let state = EditorState::new(schema).unwrap();
        assert_eq!(state.doc.describe(), "doc(paragraph)");
        assert_eq!(state.version(), 0);
    }

    #[test]
    fn serialized_state_wraps_the_document() {
        let schema = Arc::new(editor_schema().unwrap());
        let state = EditorState::new(schema).unwrap();
        let serialized = state.serialize().unwrap();
        assert_eq!(serialized.doc["type"], "doc");
        assert_eq!(serialized.doc["content"][0]["type"], "paragraph");
    }
}
