//! Error types for store operations

use std::path::PathBuf;

use thiserror::Error;

pub const ASSET_URL_IS_REQUIRED: &str = "Asset URL is required";
pub const ASSET_TYPE_IS_REQUIRED: &str = "Asset type is required";
pub const COMPONENT_ID_IS_REQUIRED: &str = "component id is required";
pub const FILE_PART_IS_REQUIRED: &str =
    "Part named [file] is needed to successfully import a component";

/// Store operation result type
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// A precondition on the caller's input failed; nothing was read or written
    #[error("{0}")]
    InvalidArgument(String),

    /// An artifact requested by id does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A file exists but does not hold a valid document
    #[error("Json mapping error for {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be serialized
    #[error("Json serialization error for {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An uploaded asset could not be persisted
    #[error("Error while uploading asset in {filename} [{message}]")]
    Import { filename: String, message: String },
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for conditions the caller caused and can fix
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Reject a failed precondition with `message`
pub(crate) fn check_argument(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(StoreError::invalid(message))
    }
}
