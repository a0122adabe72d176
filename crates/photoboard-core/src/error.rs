//! Error types for PhotoBoard.

use thiserror::Error;

/// A shared error type for the whole board.
///
/// Structural variants (`InvalidConfig`, `NotFound`, `PermissionDenied`) are
/// usage errors and fail the call that caused them. Transport variants
/// (`PublishFailed`, `SaveFailed`) are recoverable and are normally reported
/// through the sync-state indicator instead of being returned to a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Bad area count or malformed collection, rejected before mutation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The caller's role is not allowed to run the command.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Remote publish or delete failed at the transport level.
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// Every persistence tier rejected the write.
    #[error("Save failed: {0}")]
    SaveFailed(String),

    /// Media upload collaborator error.
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Remote asset deletion collaborator error.
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted format migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a PublishFailed error
    pub fn publish_failed(message: impl Into<String>) -> Self {
        Self::PublishFailed(message.into())
    }

    /// Creates a SaveFailed error
    pub fn save_failed(message: impl Into<String>) -> Self {
        Self::SaveFailed(message.into())
    }

    /// Creates an UploadFailed error
    pub fn upload_failed(message: impl Into<String>) -> Self {
        Self::UploadFailed(message.into())
    }

    /// Creates a DeleteFailed error
    pub fn delete_failed(message: impl Into<String>) -> Self {
        Self::DeleteFailed(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates a Migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvalidConfig error
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// Transport errors degrade the sync status; they never unwind a local
    /// mutation.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::PublishFailed(_) | Self::SaveFailed(_))
    }

    /// Usage errors that must fail the originating call synchronously.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::NotFound { .. } | Self::PermissionDenied(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BoardError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for BoardError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, BoardError>`.
pub type Result<T> = std::result::Result<T, BoardError>;
