use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for corpus source, shard packing, upload, and configuration failures.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("corpus source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error("corpus source '{source_id}' returned inconsistent data: {details}")]
    SourceInconsistent {
        source_id: SourceId,
        details: String,
    },
    #[error("shard packing failure: {0}")]
    Pack(String),
    #[error("hub request failure: {0}")]
    Hub(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}
