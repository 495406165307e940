//! Site bootstrap: open the database and wire the services once.

use crate::config::Config;
use crate::content_translation::FieldTranslationManager;
use crate::db::Database;
use crate::extension::ModuleList;
use crate::i18n::{ConfigurableLanguageManager, Language, LanguageDefault, LanguageStore};
use crate::migrator::DefaultLanguageMigrator;
use crate::system_config::{ConfigFactory, DEFAULT_LANGCODE, SYSTEM_SITE};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A booted site with its services.
pub struct Site {
    db: Database,
    config_factory: ConfigFactory,
    language_default: Arc<LanguageDefault>,
    language_manager: Arc<ConfigurableLanguageManager>,
    modules: Arc<ModuleList>,
}

impl Site {
    pub fn open(config: &Config) -> Result<Self> {
        let db = Database::new(&config.database_path)?;
        db.set_busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        let config_factory = ConfigFactory::new(Arc::new(db.clone()));
        let language_default = Arc::new(LanguageDefault::new(Self::load_default_language(
            &db,
            &config_factory,
        )?));
        let language_manager = Arc::new(ConfigurableLanguageManager::new(
            Arc::new(db.clone()),
            language_default.clone(),
        ));
        let modules = Arc::new(
            ModuleList::load(&config_factory).context("Failed to read the installed modules")?,
        );

        info!(
            "Opened site at {} (default language \"{}\", {} modules)",
            config.database_path,
            language_default.get().id(),
            modules.count()
        );

        Ok(Self {
            db,
            config_factory,
            language_default,
            language_manager,
            modules,
        })
    }

    /// Resolve the configured default language.
    ///
    /// Falls back to English when `system.site` names no language or one
    /// that is not stored.
    fn load_default_language(db: &Database, config_factory: &ConfigFactory) -> Result<Language> {
        let site = config_factory
            .get(SYSTEM_SITE)
            .context("Failed to read site configuration")?;

        let Some(langcode) = site.get(DEFAULT_LANGCODE).and_then(|v| v.as_str()) else {
            warn!("No default language configured, assuming English");
            return Ok(Language::site_default());
        };

        match db
            .load(langcode)
            .context(format!("Failed to load default language \"{}\"", langcode))?
        {
            Some(language) => Ok(language),
            None => {
                warn!(
                    "Default language \"{}\" is not stored, assuming English",
                    langcode
                );
                Ok(Language::site_default())
            }
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn language_default(&self) -> &LanguageDefault {
        &self.language_default
    }

    pub fn migrator(&self) -> DefaultLanguageMigrator {
        DefaultLanguageMigrator::new(
            Arc::new(self.db.clone()),
            self.language_default.clone(),
            self.language_manager.clone(),
            self.config_factory.clone(),
            Arc::new(self.db.clone()),
            Arc::new(FieldTranslationManager),
            self.modules.clone(),
        )
    }
}
