use thiserror::Error;

/// Errors raised by the storage backends behind the collaborator traits.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("The \"{entity_type}\" entity type does not exist.")]
    UnknownEntityType { entity_type: String },

    #[error("The \"{entity_type}\" entity type did not specify a storage handler.")]
    MissingStorageHandler { entity_type: String },

    #[error("The \"{entity_type}\" entity type specifies an unsupported storage handler \"{handler}\".")]
    UnsupportedStorageHandler { entity_type: String, handler: String },

    #[error("Invalid {entity_type} entity: {reason}")]
    InvalidEntity { entity_type: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn invalid(entity_type: &str, reason: impl Into<String>) -> Self {
        StorageError::InvalidEntity {
            entity_type: entity_type.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by a broken entity-type definition rather than the data.
    pub fn is_plugin_error(&self) -> bool {
        matches!(
            self,
            StorageError::UnknownEntityType { .. }
                | StorageError::MissingStorageHandler { .. }
                | StorageError::UnsupportedStorageHandler { .. }
        )
    }
}

/// Errors that stop a migration outright.
///
/// Per-entity-type storage failures are not represented here: they are
/// logged and recorded in the report while the run continues.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to persist the default language in \"{config}\": {source}")]
    Config {
        config: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to write command output: {0}")]
    Output(#[from] std::io::Error),
}
