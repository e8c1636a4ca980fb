//! # Vellum Editor
//!
//! The editor runtime around the document model: editor state,
//! transactions, the view provider commands run through, and the
//! debounced persistence loop.
//!
//! ## Architecture
//!
//! ```text
//! commands ──exec──▶ ViewProvider ──apply──▶ EditorState / Transaction
//!                        │ on_edit
//!                        ▼
//!                  SyncDebouncer ──quiet period──▶ Store::sync
//!                                                    │
//! Store::load ──hydrate on attach──▶ ViewProvider    ▼
//!                                          Storage (memory / file)
//! ```
//!
//! Edits notify the view's edit listener, the listener schedules a
//! debounced sync, and the sync writes the serialized state through a
//! [`Storage`] backend under [`STORAGE_KEY`]. The next session loads
//! and replays it.

pub mod commands;
pub mod debounce;
pub mod error;
pub mod schema;
pub mod state;
pub mod store;
pub mod transaction;
pub mod view;

pub use commands::{clear_document, insert_broken_table, insert_filled_table};
pub use debounce::{SyncDebouncer, DEFAULT_SYNC_QUIET};
pub use error::EditorError;
pub use schema::editor_schema;
pub use state::{EditorState, SerializedState};
pub use store::{FileStorage, MemoryStorage, Storage, Store, StoreError, STORAGE_KEY};
pub use transaction::{Step, Transaction, TransformError};
pub use view::{Command, ViewProvider};
