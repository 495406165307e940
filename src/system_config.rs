//! Named configuration objects (`system.site`, `core.extension`, ...).
//!
//! Each object is a flat JSON map stored under its name. Reads go through
//! [`ConfigFactory::get`], changes through an [`EditableConfig`] handle:
//!
//! ```rust,ignore
//! factory
//!     .get_editable("system.site")?
//!     .set("default_langcode", "es")
//!     .save()?;
//! ```

use crate::error::StorageError;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Config object holding the site-wide settings.
pub const SYSTEM_SITE: &str = "system.site";

/// Key of the default language code inside [`SYSTEM_SITE`].
pub const DEFAULT_LANGCODE: &str = "default_langcode";

/// Raw storage for configuration objects.
pub trait ConfigStorage: Send + Sync {
    fn read(&self, name: &str) -> Result<Option<Map<String, Value>>, StorageError>;

    fn write(&self, name: &str, data: &Map<String, Value>) -> Result<(), StorageError>;

    /// Names of all stored objects starting with `prefix`.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Hands out read-only and editable views of configuration objects.
#[derive(Clone)]
pub struct ConfigFactory {
    storage: Arc<dyn ConfigStorage>,
}

impl ConfigFactory {
    pub fn new(storage: Arc<dyn ConfigStorage>) -> Self {
        Self { storage }
    }

    /// Read a configuration object. Missing objects read as empty.
    pub fn get(&self, name: &str) -> Result<Map<String, Value>, StorageError> {
        Ok(self.storage.read(name)?.unwrap_or_default())
    }

    /// Open a configuration object for modification.
    pub fn get_editable(&self, name: &str) -> Result<EditableConfig<'_>, StorageError> {
        Ok(EditableConfig {
            name: name.to_string(),
            data: self.get(name)?,
            storage: self.storage.as_ref(),
        })
    }
}

/// A configuration object opened for writing. Changes stay local until [`save`](Self::save).
pub struct EditableConfig<'a> {
    name: String,
    data: Map<String, Value>,
    storage: &'a dyn ConfigStorage,
}

impl EditableConfig<'_> {
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn save(&self) -> Result<(), StorageError> {
        self.storage.write(&self.name, &self.data)
    }
}
