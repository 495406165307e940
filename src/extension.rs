//! Installed module list, read once from the `core.extension` config object.

use crate::error::StorageError;
use crate::system_config::ConfigFactory;
use std::collections::BTreeSet;

/// Config object listing installed modules under its `module` key.
pub const CORE_EXTENSION: &str = "core.extension";

/// Module providing translation metadata for content entities.
pub const CONTENT_TRANSLATION: &str = "content_translation";

pub trait ModuleHandler: Send + Sync {
    fn module_exists(&self, name: &str) -> bool;
}

/// Snapshot of the installed modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleList {
    modules: BTreeSet<String>,
}

impl ModuleList {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    /// Read the installed modules from `core.extension`.
    ///
    /// The `module` key maps module names to their install weight; only the
    /// names matter here.
    pub fn load(config_factory: &ConfigFactory) -> Result<Self, StorageError> {
        let extension = config_factory.get(CORE_EXTENSION)?;
        let modules = extension
            .get("module")
            .and_then(|modules| modules.as_object())
            .map(|modules| modules.keys().cloned().collect())
            .unwrap_or_default();

        Ok(Self { modules })
    }

    pub fn count(&self) -> usize {
        self.modules.len()
    }
}

impl ModuleHandler for ModuleList {
    fn module_exists(&self, name: &str) -> bool {
        self.modules.contains(name)
    }
}
