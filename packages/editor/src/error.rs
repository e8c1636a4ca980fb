//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Schema error: {0}")]
    Schema(#[from] vellum_model::SchemaError),

    #[error("Transform error: {0}")]
    Transform(#[from] crate::transaction::TransformError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
