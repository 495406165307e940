//! Language services: storage, the default-language pointer and the manager
//! that answers "which languages does this site have".

use crate::error::StorageError;
use crate::i18n::{Direction, Language};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// Persistent storage for configurable languages.
pub trait LanguageStore: Send + Sync {
    /// Load a language by code.
    fn load(&self, id: &str) -> Result<Option<Language>, StorageError>;

    /// Load every stored language, locked ones included.
    fn load_all(&self) -> Result<Vec<Language>, StorageError>;

    /// Build a new, unsaved language placed after the existing ones.
    fn create(&self, id: &str, label: &str, direction: Direction) -> Result<Language, StorageError> {
        let next_weight = self
            .load_all()?
            .iter()
            .map(Language::weight)
            .max()
            .map_or(0, |weight| weight + 1);

        Ok(Language::new(id, label, direction).with_weight(next_weight))
    }

    /// Persist a language.
    fn save(&self, language: &Language) -> Result<(), StorageError>;
}

/// The in-memory default language of the running site.
#[derive(Debug)]
pub struct LanguageDefault {
    language: RwLock<Language>,
}

impl LanguageDefault {
    pub fn new(language: Language) -> Self {
        Self {
            language: RwLock::new(language),
        }
    }

    pub fn get(&self) -> Language {
        self.language
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, language: Language) {
        *self.language.write().unwrap_or_else(PoisonError::into_inner) = language;
    }
}

/// Read access to the site's languages.
pub trait LanguageManager: Send + Sync {
    fn default_language(&self) -> Language;

    /// Configurable languages keyed by code. Locked system languages are excluded.
    fn languages(&self) -> Result<BTreeMap<String, Language>, StorageError>;

    /// Whether the site has more than one configurable language.
    fn is_multilingual(&self) -> Result<bool, StorageError> {
        Ok(self.languages()?.len() > 1)
    }

    /// Drop anything derived from stored languages or the default.
    fn reset(&self);
}

/// Language manager backed by a [`LanguageStore`], caching the language list
/// until [`LanguageManager::reset`] is called.
pub struct ConfigurableLanguageManager {
    store: Arc<dyn LanguageStore>,
    language_default: Arc<LanguageDefault>,
    languages: Mutex<Option<BTreeMap<String, Language>>>,
}

impl ConfigurableLanguageManager {
    pub fn new(store: Arc<dyn LanguageStore>, language_default: Arc<LanguageDefault>) -> Self {
        Self {
            store,
            language_default,
            languages: Mutex::new(None),
        }
    }
}

impl LanguageManager for ConfigurableLanguageManager {
    fn default_language(&self) -> Language {
        self.language_default.get()
    }

    fn languages(&self) -> Result<BTreeMap<String, Language>, StorageError> {
        let mut cache = self.languages.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(languages) = cache.as_ref() {
            return Ok(languages.clone());
        }

        let languages: BTreeMap<String, Language> = self
            .store
            .load_all()?
            .into_iter()
            .filter(|language| !language.is_locked())
            .map(|language| (language.id().to_string(), language))
            .collect();

        debug!("Loaded {} configurable languages", languages.len());
        *cache = Some(languages.clone());
        Ok(languages)
    }

    fn reset(&self) {
        *self.languages.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use tempfile::TempDir;

    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("site.db");
        let db = Database::new(db_path.to_str().unwrap()).expect("Failed to create database");
        (db, temp_dir)
    }

    fn manager(db: &Database) -> ConfigurableLanguageManager {
        ConfigurableLanguageManager::new(
            Arc::new(db.clone()),
            Arc::new(LanguageDefault::new(Language::site_default())),
        )
    }

    // ==================== LanguageDefault Tests ====================

    #[test]
    fn test_language_default_get_and_set() {
        let language_default = LanguageDefault::new(Language::site_default());
        assert_eq!(language_default.get().id(), "en");

        language_default.set(Language::new("es", "Spanish", Direction::Ltr));
        assert_eq!(language_default.get().id(), "es");
    }

    #[test]
    fn test_manager_default_follows_pointer() {
        let (db, _temp_dir) = create_test_db();
        let language_default = Arc::new(LanguageDefault::new(Language::site_default()));
        let manager = ConfigurableLanguageManager::new(Arc::new(db), language_default.clone());

        language_default.set(Language::new("fr", "French", Direction::Ltr));
        assert_eq!(manager.default_language().id(), "fr");
    }

    // ==================== Language Listing Tests ====================

    #[test]
    fn test_fresh_site_is_monolingual() {
        let (db, _temp_dir) = create_test_db();
        let manager = manager(&db);

        let languages = manager.languages().expect("Should list languages");
        assert_eq!(languages.keys().collect::<Vec<_>>(), vec!["en"]);
        assert!(!manager.is_multilingual().expect("Should check"));
    }

    #[test]
    fn test_locked_languages_are_not_listed() {
        let (db, _temp_dir) = create_test_db();
        let manager = manager(&db);

        let languages = manager.languages().expect("Should list languages");
        assert!(!languages.contains_key(Language::NOT_SPECIFIED));
        assert!(!languages.contains_key(Language::NOT_APPLICABLE));
    }

    #[test]
    fn test_languages_are_cached_until_reset() {
        let (db, _temp_dir) = create_test_db();
        let manager = manager(&db);
        assert_eq!(manager.languages().unwrap().len(), 1);

        db.save(&Language::new("de", "German", Direction::Ltr))
            .expect("Should save");
        assert_eq!(manager.languages().unwrap().len(), 1, "Cached list is stale");

        manager.reset();
        assert_eq!(manager.languages().unwrap().len(), 2);
        assert!(manager.is_multilingual().unwrap());
    }

    // ==================== LanguageStore::create Tests ====================

    #[test]
    fn test_create_places_language_last() {
        let (db, _temp_dir) = create_test_db();
        let max_weight = db
            .load_all()
            .unwrap()
            .iter()
            .map(Language::weight)
            .max()
            .unwrap();

        let created = db.create("he", "Hebrew", Direction::Rtl).expect("Should create");
        assert_eq!(created.weight(), max_weight + 1);
        assert_eq!(created.direction(), Direction::Rtl);
        assert!(db.load("he").unwrap().is_none(), "create does not persist");
    }
}
