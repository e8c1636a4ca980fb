//! # Editor commands
//!
//! The three actions the panel exposes, written as [`Command`]
//! functions. The first two insert the same table type through the
//! two construction paths the model offers, which is the whole story
//! of this editor:
//!
//! * [`insert_broken_table`] uses unchecked construction and produces
//!   a table no content expression would allow,
//! * [`insert_filled_table`] uses fill-validated construction and
//!   produces the minimal legal table.
//!
//! Both insert at position 1 and both succeed. The difference only
//! surfaces when something later checks the document.
//!
//! [`Command`]: crate::view::Command

use vellum_model::{Attrs, Node, Schema, SchemaError};

use crate::state::EditorState;
use crate::transaction::Transaction;

// Four rows of two empty cells, parented straight under the table
// with no body. Unchecked construction takes it without complaint
// even though `table` wants `table_colgroup? table_body` and the body
// wants three rows minimum.
fn broken_table(schema: &Schema) -> Result<Node, SchemaError> {
    let rows = (0..4)
        .map(|_| {
            let cells = vec![
                schema.node("table_cell", Attrs::new(), vec![], vec![])?,
                schema.node("table_cell", Attrs::new(), vec![], vec![])?,
            ];
            schema.node("table_row", Attrs::new(), cells, vec![])
        })
        .collect::<Result<Vec<_>, _>>()?;
    schema.node("table", Attrs::new(), rows, vec![])
}

/// Inserts a structurally invalid table at position 1.
pub fn insert_broken_table(
    state: &EditorState,
    dispatch: &mut dyn FnMut(Transaction),
) -> bool {
    match broken_table(&state.schema) {
        Ok(table) => {
            dispatch(Transaction::new().insert(1, table));
            true
        }
        Err(error) => {
            tracing::warn!(%error, "table could not be constructed");
            false
        }
    }
}

/// Inserts a filled, schema-valid table at position 1.
pub fn insert_filled_table(
    state: &EditorState,
    dispatch: &mut dyn FnMut(Transaction),
) -> bool {
    match state.schema.node_and_fill("table", Attrs::new(), vec![]) {
        Ok(table) => {
            dispatch(Transaction::new().insert(1, table));
            true
        }
        Err(error) => {
            tracing::warn!(%error, "table could not be filled");
            false
        }
    }
}

/// Deletes the document's entire content range, leaving a document
/// with no children at all.
pub fn clear_document(state: &EditorState, dispatch: &mut dyn FnMut(Transaction)) -> bool {
    let size = state.doc.content_size(&state.schema);
    dispatch(Transaction::new().delete(0, size));
    true
}
