//! # View provider
//!
//! The [`ViewProvider`] owns the live [`EditorState`] and is the one
//! place transactions enter it. Commands run against the current
//! state and hand their transactions to a dispatch callback; the
//! provider applies them in dispatch order and notifies the edit
//! listener once per applied transaction, which is what drives the
//! debounced store sync.
//!
//! Hydration from stored JSON goes around the transaction path on
//! purpose. Restoring a previous session is not an edit and must not
//! schedule a sync of its own.

use crate::error::EditorError;
use crate::state::{EditorState, SerializedState};
use crate::transaction::Transaction;

/// A command inspects the state and, when it applies, hands
/// transactions to `dispatch`. The return value says whether the
/// command considered itself applicable.
pub type Command = fn(&EditorState, &mut dyn FnMut(Transaction)) -> bool;

/// Holds the editor state and routes transactions into it.
pub struct ViewProvider {
    state: EditorState,
    on_edit: Option<Box<dyn FnMut()>>,
}

impl ViewProvider {
    pub fn new(state: EditorState) -> ViewProvider {
        ViewProvider {
            state,
            on_edit: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Registers the listener called after every applied transaction.
    pub fn set_on_edit(&mut self, on_edit: impl FnMut() + 'static) {
        self.on_edit = Some(Box::new(on_edit));
    }

    /// Applies one transaction and fires the edit listener.
    pub fn dispatch(&mut self, transaction: Transaction) -> Result<(), EditorError> {
        self.state.apply(transaction)?;
        if let Some(on_edit) = &mut self.on_edit {
            on_edit();
        }
        Ok(())
    }

    /// Runs a command against the current state. Transactions the
    /// command dispatches are queued while it runs and applied, in
    /// order, after it returns. The command's own verdict is passed
    /// through.
    pub fn exec_command<F>(&mut self, command: F) -> Result<bool, EditorError>
    where
        F: FnOnce(&EditorState, &mut dyn FnMut(Transaction)) -> bool,
    {
        let mut queue = Vec::new();
        let executed = command(&self.state, &mut |transaction| queue.push(transaction));
        for transaction in queue {
            self.dispatch(transaction)?;
        }
        Ok(executed)
    }

    /// Replaces the state with one restored from stored JSON. The
    /// document is adopted the way it was persisted; the edit listener
    /// stays quiet.
    pub fn hydrate_state_from_json(
        &mut self,
        serialized: &SerializedState,
    ) -> Result<(), EditorError> {
        let schema = self.state.schema.clone();
        let doc = schema.node_from_value(&serialized.doc)?;
        self.state = EditorState::with_doc(schema, doc);
        tracing::debug!("hydrated editor state from storage");
        Ok(())
    }

    /// The current state in its persisted form.
    pub fn state_to_json(&self) -> Result<SerializedState, EditorError> {
        self.state.serialize()
    }
}
