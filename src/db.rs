use crate::entity::{
    ContentEntity, EntityKind, EntityStorage, EntityTypeDefinition, EntityTypeManager, Translation,
    TranslationMetadata,
};
use crate::error::StorageError;
use crate::extension::CORE_EXTENSION;
use crate::i18n::{Language, LanguageStore};
use crate::system_config::{ConfigStorage, DEFAULT_LANGCODE, SYSTEM_SITE};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::info;

/// Config name prefix under which languages are stored.
const LANGUAGE_CONFIG_PREFIX: &str = "language.entity.";

/// The only storage handler this backend implements.
const SQL_STORAGE_HANDLER: &str = "sql";

/// SQLite database holding a site's configuration, entity types and content.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a site database.
    ///
    /// A database without a `system.site` config object gets the standard
    /// install: English as the only configurable and default language, the
    /// locked system languages, and the `system` and `language` modules.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS config (
                name TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entity_types (
                id TEXT PRIMARY KEY,
                label TEXT NOT NULL,
                kind TEXT NOT NULL,
                storage_handler TEXT NOT NULL DEFAULT 'sql',
                langcode_key TEXT,
                translatable INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS content_entities (
                entity_type TEXT NOT NULL,
                id TEXT NOT NULL,
                label TEXT NOT NULL,
                langcode TEXT,
                changed TEXT NOT NULL,
                PRIMARY KEY (entity_type, id)
            );

            CREATE TABLE IF NOT EXISTS content_translations (
                entity_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                langcode TEXT NOT NULL,
                label TEXT NOT NULL,
                source_langcode TEXT,
                outdated INTEGER NOT NULL DEFAULT 0,
                changed TEXT NOT NULL,
                PRIMARY KEY (entity_type, entity_id, langcode),
                FOREIGN KEY (entity_type, entity_id)
                    REFERENCES content_entities (entity_type, id) ON DELETE CASCADE
            );",
        )
        .context("Failed to create site schema")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        if db.needs_install()? {
            db.install()?;
        }

        Ok(db)
    }

    /// Wait up to `timeout` for locks held by other connections.
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn()
            .busy_timeout(timeout)
            .context("Failed to set busy timeout")
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn needs_install(&self) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM config WHERE name = ?1",
            params![SYSTEM_SITE],
            |row| row.get(0),
        )?;
        Ok(count == 0)
    }

    /// Run the standard install in a single transaction
    fn install(&self) -> Result<()> {
        info!("Installing standard site configuration");
        self.conn().execute_batch("BEGIN TRANSACTION")?;

        match self.install_inner() {
            Ok(_) => {
                self.conn().execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                self.conn().execute_batch("ROLLBACK")?;
                Err(e).context("Site install failed and was rolled back")
            }
        }
    }

    fn install_inner(&self) -> Result<(), StorageError> {
        self.save(&Language::site_default())?;
        for language in Language::locked_defaults() {
            self.save(&language)?;
        }

        self.write(
            SYSTEM_SITE,
            &as_object(json!({
                "name": "Site",
                DEFAULT_LANGCODE: Language::site_default().id(),
            })),
        )?;
        self.write(
            CORE_EXTENSION,
            &as_object(json!({
                "module": { "system": 0, "language": 0 },
            })),
        )?;

        Ok(())
    }

    /// Register (or replace) an entity type definition.
    pub fn register_entity_type(&self, definition: &EntityTypeDefinition) -> Result<(), StorageError> {
        self.conn().execute(
            "INSERT INTO entity_types (id, label, kind, storage_handler, langcode_key, translatable)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                label = excluded.label,
                kind = excluded.kind,
                storage_handler = excluded.storage_handler,
                langcode_key = excluded.langcode_key,
                translatable = excluded.translatable",
            params![
                definition.id,
                definition.label,
                definition.kind.as_str(),
                definition.storage_handler,
                definition.langcode_key,
                definition.translatable,
            ],
        )?;
        Ok(())
    }

    /// Add a module to the installed list in `core.extension`.
    pub fn install_module(&self, name: &str) -> Result<(), StorageError> {
        let mut extension = self.read(CORE_EXTENSION)?.unwrap_or_default();
        let modules = extension
            .entry("module")
            .or_insert_with(|| Value::Object(Map::new()));

        if !modules.is_object() {
            *modules = Value::Object(Map::new());
        }
        if let Some(modules) = modules.as_object_mut() {
            modules.insert(name.to_string(), Value::from(0));
        }

        self.write(CORE_EXTENSION, &extension)
    }

    fn definition(&self, entity_type_id: &str) -> Result<Option<EntityTypeDefinition>, StorageError> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, label, kind, storage_handler, langcode_key, translatable
                 FROM entity_types WHERE id = ?1",
                params![entity_type_id],
                definition_row,
            )
            .optional()?;

        row.map(into_definition).transpose()
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<(), StorageError> {
        self.conn().execute_batch(sql)?;
        Ok(())
    }
}

type DefinitionRow = (String, String, String, String, Option<String>, bool);

fn definition_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DefinitionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_definition(row: DefinitionRow) -> Result<EntityTypeDefinition, StorageError> {
    let (id, label, kind, storage_handler, langcode_key, translatable) = row;

    let kind = match kind.as_str() {
        "content" => EntityKind::Content,
        "config" => EntityKind::Config,
        other => {
            return Err(StorageError::invalid(
                "entity_type",
                format!("\"{}\" has unknown kind \"{}\"", id, other),
            ))
        }
    };

    Ok(EntityTypeDefinition {
        id,
        label,
        kind,
        storage_handler,
        langcode_key,
        translatable,
    })
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ==================== Configuration ====================

impl ConfigStorage for Database {
    fn read(&self, name: &str) -> Result<Option<Map<String, Value>>, StorageError> {
        let data: Option<String> = self
            .conn()
            .query_row(
                "SELECT data FROM config WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(data.map(|data| serde_json::from_str(&data)).transpose()?)
    }

    fn write(&self, name: &str, data: &Map<String, Value>) -> Result<(), StorageError> {
        let data = serde_json::to_string(data)?;
        self.conn().execute(
            "INSERT INTO config (name, data) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET data = excluded.data",
            params![name, data],
        )?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT name FROM config WHERE substr(name, 1, length(?1)) = ?1 ORDER BY name",
        )?;

        let names = stmt
            .query_map(params![prefix], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }
}

// ==================== Languages ====================

impl LanguageStore for Database {
    fn load(&self, id: &str) -> Result<Option<Language>, StorageError> {
        self.read(&format!("{}{}", LANGUAGE_CONFIG_PREFIX, id))?
            .map(|data| serde_json::from_value(Value::Object(data)))
            .transpose()
            .map_err(StorageError::from)
    }

    fn load_all(&self) -> Result<Vec<Language>, StorageError> {
        let mut languages = Vec::new();
        for name in self.list(LANGUAGE_CONFIG_PREFIX)? {
            if let Some(data) = self.read(&name)? {
                languages.push(serde_json::from_value::<Language>(Value::Object(data))?);
            }
        }

        languages.sort_by(|a, b| a.weight().cmp(&b.weight()).then_with(|| a.id().cmp(b.id())));
        Ok(languages)
    }

    fn save(&self, language: &Language) -> Result<(), StorageError> {
        if language.id().is_empty() {
            return Err(StorageError::invalid(
                "configurable_language",
                "language code cannot be empty",
            ));
        }
        if language.id().chars().count() > Language::MAX_CODE_LENGTH {
            return Err(StorageError::invalid(
                "configurable_language",
                format!(
                    "language code \"{}\" is longer than {} characters",
                    language.id(),
                    Language::MAX_CODE_LENGTH
                ),
            ));
        }

        let data = as_object(serde_json::to_value(language)?);
        self.write(&format!("{}{}", LANGUAGE_CONFIG_PREFIX, language.id()), &data)
    }
}

// ==================== Entities ====================

impl EntityTypeManager for Database {
    fn definitions(&self) -> Result<BTreeMap<String, EntityTypeDefinition>, StorageError> {
        let rows = {
            let conn = self.conn();
            let mut stmt = conn.prepare(
                "SELECT id, label, kind, storage_handler, langcode_key, translatable
                 FROM entity_types ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], definition_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter()
            .map(|row| into_definition(row).map(|definition| (definition.id.clone(), definition)))
            .collect()
    }

    fn storage(&self, entity_type_id: &str) -> Result<Box<dyn EntityStorage + '_>, StorageError> {
        let definition =
            self.definition(entity_type_id)?
                .ok_or_else(|| StorageError::UnknownEntityType {
                    entity_type: entity_type_id.to_string(),
                })?;

        match definition.storage_handler.as_str() {
            "" => Err(StorageError::MissingStorageHandler {
                entity_type: definition.id,
            }),
            SQL_STORAGE_HANDLER => Ok(Box::new(SqlEntityStorage {
                db: self,
                entity_type: definition.id,
            })),
            other => Err(StorageError::UnsupportedStorageHandler {
                entity_type: definition.id.clone(),
                handler: other.to_string(),
            }),
        }
    }
}

/// Entity storage for one entity type in the site database.
struct SqlEntityStorage<'a> {
    db: &'a Database,
    entity_type: String,
}

impl SqlEntityStorage<'_> {
    fn check_entity_type(&self, entity_type: &str) -> Result<(), StorageError> {
        if entity_type != self.entity_type {
            return Err(StorageError::invalid(
                &self.entity_type,
                format!("cannot save a \"{}\" entity in this storage", entity_type),
            ));
        }
        Ok(())
    }
}

impl EntityStorage for SqlEntityStorage<'_> {
    fn load_multiple(&self) -> Result<BTreeMap<String, ContentEntity>, StorageError> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare(
            "SELECT id, label, langcode, changed FROM content_entities
             WHERE entity_type = ?1 ORDER BY id",
        )?;
        let mut entities = stmt
            .query_map(params![self.entity_type], |row| {
                let id: String = row.get(0)?;
                let label: String = row.get(1)?;
                let langcode: Option<String> = row.get(2)?;
                let mut entity = ContentEntity::new(&self.entity_type, &id, &label);
                if let Some(langcode) = langcode {
                    entity.set_langcode(&langcode);
                }
                entity.changed = Some(row.get(3)?);
                Ok((id, entity))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT entity_id, langcode, label, source_langcode, outdated, changed
             FROM content_translations WHERE entity_type = ?1",
        )?;
        let translations = stmt
            .query_map(params![self.entity_type], |row| {
                Ok(Translation {
                    entity_type: self.entity_type.clone(),
                    entity_id: row.get(0)?,
                    langcode: row.get(1)?,
                    label: row.get(2)?,
                    metadata: TranslationMetadata {
                        source: row.get(3)?,
                        outdated: row.get(4)?,
                    },
                    changed: Some(row.get(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for translation in translations {
            if let Some(entity) = entities.get_mut(&translation.entity_id) {
                entity.add_translation(translation);
            }
        }

        Ok(entities)
    }

    fn save(&self, entity: &ContentEntity) -> Result<(), StorageError> {
        self.check_entity_type(&entity.entity_type)?;

        self.db.conn().execute(
            "INSERT INTO content_entities (entity_type, id, label, langcode, changed)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(entity_type, id) DO UPDATE SET
                label = excluded.label,
                langcode = excluded.langcode,
                changed = excluded.changed",
            params![
                entity.entity_type,
                entity.id,
                entity.label,
                entity.langcode(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn save_translation(&self, translation: &Translation) -> Result<(), StorageError> {
        self.check_entity_type(&translation.entity_type)?;

        self.db.conn().execute(
            "INSERT INTO content_translations
                (entity_type, entity_id, langcode, label, source_langcode, outdated, changed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(entity_type, entity_id, langcode) DO UPDATE SET
                label = excluded.label,
                source_langcode = excluded.source_langcode,
                outdated = excluded.outdated,
                changed = excluded.changed",
            params![
                translation.entity_type,
                translation.entity_id,
                translation.langcode,
                translation.label,
                translation.metadata.source,
                translation.metadata.outdated,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Direction;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    /// Create a temporary site database for testing
    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_site.db");
        let db = Database::new(db_path.to_str().unwrap()).expect("Failed to create database");
        (db, temp_dir)
    }

    fn seed_node(db: &Database, id: &str, langcode: &str) -> ContentEntity {
        db.register_entity_type(&EntityTypeDefinition::content("node", "Content").translatable())
            .expect("Should register");
        let entity = ContentEntity::new("node", id, &format!("Node {}", id)).with_langcode(langcode);
        db.storage("node")
            .expect("Should get storage")
            .save(&entity)
            .expect("Should save");
        entity
    }

    // ==================== Database Initialization Tests ====================

    #[test]
    fn test_database_creation_installs_site() {
        let (db, _temp_dir) = create_test_db();

        let site = db.read(SYSTEM_SITE).unwrap().expect("system.site exists");
        assert_eq!(site.get(DEFAULT_LANGCODE), Some(&Value::from("en")));

        let ids: Vec<_> = db
            .load_all()
            .unwrap()
            .into_iter()
            .map(|l| l.id().to_string())
            .collect();
        assert_eq!(ids, vec!["en", "und", "zxx"]);
    }

    #[test]
    fn test_database_reopening_keeps_changes() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let path_str = db_path.to_str().unwrap();

        {
            let db = Database::new(path_str).expect("Failed to create database");
            let mut site = db.read(SYSTEM_SITE).unwrap().unwrap();
            site.insert(DEFAULT_LANGCODE.to_string(), Value::from("fr"));
            db.write(SYSTEM_SITE, &site).expect("Should write");
        }

        {
            let db = Database::new(path_str).expect("Failed to reopen database");
            let site = db.read(SYSTEM_SITE).unwrap().unwrap();
            assert_eq!(
                site.get(DEFAULT_LANGCODE),
                Some(&Value::from("fr")),
                "Reopening must not reinstall"
            );
        }
    }

    #[test]
    fn test_invalid_database_path() {
        let result = Database::new("/non/existent/path/site.db");
        assert!(result.is_err());
    }

    #[test]
    fn test_set_busy_timeout() {
        let (db, _temp_dir) = create_test_db();
        db.set_busy_timeout(Duration::from_millis(250))
            .expect("Should set timeout");
    }

    // ==================== Config Storage Tests ====================

    #[test]
    fn test_config_list_by_prefix() {
        let (db, _temp_dir) = create_test_db();

        let names = db.list(LANGUAGE_CONFIG_PREFIX).unwrap();
        assert_eq!(
            names,
            vec!["language.entity.en", "language.entity.und", "language.entity.zxx"]
        );
        assert_eq!(db.list("core.").unwrap(), vec![CORE_EXTENSION]);
    }

    #[test]
    fn test_config_read_missing() {
        let (db, _temp_dir) = create_test_db();
        assert!(db.read("views.view.frontpage").unwrap().is_none());
    }

    #[test]
    fn test_install_module() {
        let (db, _temp_dir) = create_test_db();
        db.install_module("content_translation").expect("Should install");

        let extension = db.read(CORE_EXTENSION).unwrap().unwrap();
        let modules = extension.get("module").unwrap().as_object().unwrap();
        assert!(modules.contains_key("content_translation"));
        assert!(modules.contains_key("system"));
    }

    // ==================== Language Store Tests ====================

    #[test]
    fn test_language_round_trip_keeps_direction() {
        let (db, _temp_dir) = create_test_db();
        let arabic = Language::new("ar", "Arabic", Direction::Rtl).with_weight(3);

        db.save(&arabic).expect("Should save");
        assert_eq!(db.load("ar").unwrap(), Some(arabic));
    }

    #[test]
    fn test_load_unknown_language() {
        let (db, _temp_dir) = create_test_db();
        assert!(db.load("xx").unwrap().is_none());
    }

    #[test]
    fn test_save_rejects_empty_code() {
        let (db, _temp_dir) = create_test_db();
        let result = db.save(&Language::new("", "Nameless", Direction::Ltr));

        let err = result.expect_err("Empty code must be rejected");
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_save_rejects_long_code() {
        let (db, _temp_dir) = create_test_db();
        let result = db.save(&Language::new("abcdefghijklm", "Too long", Direction::Ltr));
        assert!(result.is_err());
    }

    // ==================== Entity Type Tests ====================

    #[test]
    fn test_definitions() {
        let (db, _temp_dir) = create_test_db();
        db.register_entity_type(&EntityTypeDefinition::content("node", "Content").translatable())
            .unwrap();
        db.register_entity_type(
            &EntityTypeDefinition::content("view", "View").with_kind(EntityKind::Config),
        )
        .unwrap();

        let definitions = db.definitions().expect("Should list");
        assert_eq!(definitions.len(), 2);
        assert!(definitions["node"].is_translatable());
        assert!(!definitions["view"].is_content());
    }

    #[test]
    fn test_register_replaces_definition() {
        let (db, _temp_dir) = create_test_db();
        db.register_entity_type(&EntityTypeDefinition::content("node", "Content"))
            .unwrap();
        db.register_entity_type(&EntityTypeDefinition::content("node", "Content").without_langcode())
            .unwrap();

        let definitions = db.definitions().unwrap();
        assert!(!definitions["node"].has_langcode_key());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let (db, _temp_dir) = create_test_db();
        db.execute_batch(
            "INSERT INTO entity_types (id, label, kind) VALUES ('odd', 'Odd', 'plugin')",
        )
        .unwrap();

        assert!(db.definitions().is_err());
    }

    #[test]
    fn test_storage_for_unknown_type() {
        let (db, _temp_dir) = create_test_db();
        let err = db.storage("node").err().expect("Should fail");
        assert!(matches!(err, StorageError::UnknownEntityType { .. }));
    }

    #[test]
    fn test_storage_with_missing_handler() {
        let (db, _temp_dir) = create_test_db();
        db.register_entity_type(&EntityTypeDefinition::content("node", "Content").with_storage_handler(""))
            .unwrap();

        let err = db.storage("node").err().expect("Should fail");
        assert!(matches!(err, StorageError::MissingStorageHandler { .. }));
    }

    #[test]
    fn test_storage_with_unsupported_handler() {
        let (db, _temp_dir) = create_test_db();
        db.register_entity_type(
            &EntityTypeDefinition::content("remote", "Remote").with_storage_handler("mongodb"),
        )
        .unwrap();

        let err = db.storage("remote").err().expect("Should fail");
        assert!(err.is_plugin_error());
        assert!(err.to_string().contains("mongodb"));
    }

    // ==================== Entity Storage Tests ====================

    #[test]
    fn test_save_and_load_entities() {
        let (db, _temp_dir) = create_test_db();
        seed_node(&db, "1", "en");
        seed_node(&db, "2", "fr");

        let entities = db.storage("node").unwrap().load_multiple().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities["1"].langcode(), Some("en"));
        assert_eq!(entities["2"].langcode(), Some("fr"));
        assert!(entities["1"].changed.is_some());
    }

    #[test]
    fn test_save_updates_langcode() {
        let (db, _temp_dir) = create_test_db();
        let mut entity = seed_node(&db, "1", "en");
        let storage = db.storage("node").unwrap();

        entity.set_langcode("es");
        storage.save(&entity).expect("Should save");

        let entities = storage.load_multiple().unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities["1"].langcode(), Some("es"));
    }

    #[test]
    fn test_entities_are_scoped_by_type() {
        let (db, _temp_dir) = create_test_db();
        seed_node(&db, "1", "en");
        db.register_entity_type(&EntityTypeDefinition::content("block_content", "Block"))
            .unwrap();

        let blocks = db.storage("block_content").unwrap().load_multiple().unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_save_rejects_foreign_entity_type() {
        let (db, _temp_dir) = create_test_db();
        seed_node(&db, "1", "en");
        db.register_entity_type(&EntityTypeDefinition::content("block_content", "Block"))
            .unwrap();

        let node = ContentEntity::new("node", "9", "Stray").with_langcode("en");
        let result = db.storage("block_content").unwrap().save(&node);
        assert!(result.is_err());
    }

    #[test]
    fn test_translations_load_with_entity() {
        let (db, _temp_dir) = create_test_db();
        let entity = seed_node(&db, "1", "en");
        let storage = db.storage("node").unwrap();

        let mut german = Translation::new(&entity, "de", "Knoten 1").with_source("en");
        german.metadata.outdated = true;
        storage.save_translation(&german).expect("Should save");

        let entities = storage.load_multiple().unwrap();
        let loaded = entities["1"].translation("de").expect("Translation loaded");
        assert_eq!(loaded.label, "Knoten 1");
        assert_eq!(loaded.metadata.source.as_deref(), Some("en"));
        assert!(loaded.metadata.outdated);
        assert!(loaded.changed.is_some());
    }

    #[test]
    fn test_save_translation_updates_source() {
        let (db, _temp_dir) = create_test_db();
        let entity = seed_node(&db, "1", "en");
        let storage = db.storage("node").unwrap();

        storage
            .save_translation(&Translation::new(&entity, "it", "Nodo 1").with_source("en"))
            .unwrap();
        storage
            .save_translation(&Translation::new(&entity, "it", "Nodo 1").with_source("es"))
            .unwrap();

        let entities = storage.load_multiple().unwrap();
        assert_eq!(
            entities["1"].translation("it").unwrap().metadata.source.as_deref(),
            Some("es")
        );
    }

    #[test]
    fn test_save_translation_requires_entity() {
        let (db, _temp_dir) = create_test_db();
        db.register_entity_type(&EntityTypeDefinition::content("node", "Content"))
            .unwrap();

        let orphan = ContentEntity::new("node", "404", "Missing");
        let result = db
            .storage("node")
            .unwrap()
            .save_translation(&Translation::new(&orphan, "de", "Fehlt"));
        assert!(result.is_err());
    }
}
