//! Entity types, content entities and their translations, and the storage
//! traits used to load and save them.

use crate::error::StorageError;
use std::collections::BTreeMap;

/// Whether an entity type holds user content or site configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Content,
    Config,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Content => "content",
            EntityKind::Config => "config",
        }
    }
}

/// Definition of an entity type as registered with the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTypeDefinition {
    pub id: String,
    pub label: String,
    pub kind: EntityKind,
    /// Name of the storage backend handling this type
    pub storage_handler: String,
    /// Name of the field holding the language tag, when the type has one
    pub langcode_key: Option<String>,
    pub translatable: bool,
}

impl EntityTypeDefinition {
    /// A content entity type with a `langcode` key, stored in SQL.
    pub fn content(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: EntityKind::Content,
            storage_handler: "sql".to_string(),
            langcode_key: Some("langcode".to_string()),
            translatable: false,
        }
    }

    pub fn translatable(mut self) -> Self {
        self.translatable = true;
        self
    }

    pub fn without_langcode(mut self) -> Self {
        self.langcode_key = None;
        self
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_storage_handler(mut self, handler: &str) -> Self {
        self.storage_handler = handler.to_string();
        self
    }

    pub fn is_content(&self) -> bool {
        self.kind == EntityKind::Content
    }

    pub fn has_langcode_key(&self) -> bool {
        self.langcode_key.is_some()
    }

    pub fn is_translatable(&self) -> bool {
        self.translatable
    }
}

/// Translation metadata kept alongside each translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMetadata {
    /// Language the translation was made from
    pub source: Option<String>,
    pub outdated: bool,
}

/// A language-specific view of a translatable content entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub entity_type: String,
    pub entity_id: String,
    pub langcode: String,
    pub label: String,
    pub metadata: TranslationMetadata,
    /// RFC 3339 timestamp of the last save
    pub changed: Option<String>,
}

impl Translation {
    pub fn new(entity: &ContentEntity, langcode: &str, label: &str) -> Self {
        Self {
            entity_type: entity.entity_type.clone(),
            entity_id: entity.id.clone(),
            langcode: langcode.to_string(),
            label: label.to_string(),
            metadata: TranslationMetadata::default(),
            changed: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.metadata.source = Some(source.to_string());
        self
    }
}

/// A stored content entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntity {
    pub entity_type: String,
    pub id: String,
    pub label: String,
    langcode: Option<String>,
    pub changed: Option<String>,
    translations: BTreeMap<String, Translation>,
}

impl ContentEntity {
    pub fn new(entity_type: &str, id: &str, label: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
            label: label.to_string(),
            langcode: None,
            changed: None,
            translations: BTreeMap::new(),
        }
    }

    pub fn with_langcode(mut self, langcode: &str) -> Self {
        self.langcode = Some(langcode.to_string());
        self
    }

    /// Current value of the language tag.
    pub fn langcode(&self) -> Option<&str> {
        self.langcode.as_deref()
    }

    pub fn set_langcode(&mut self, langcode: &str) {
        self.langcode = Some(langcode.to_string());
    }

    pub fn translation(&self, langcode: &str) -> Option<&Translation> {
        self.translations.get(langcode)
    }

    pub fn translation_mut(&mut self, langcode: &str) -> Option<&mut Translation> {
        self.translations.get_mut(langcode)
    }

    pub fn add_translation(&mut self, translation: Translation) {
        self.translations
            .insert(translation.langcode.clone(), translation);
    }
}

/// Storage for the entities of one entity type.
pub trait EntityStorage {
    /// Load every entity of the type, with translations, keyed by id.
    fn load_multiple(&self) -> Result<BTreeMap<String, ContentEntity>, StorageError>;

    /// Persist the entity's own fields.
    fn save(&self, entity: &ContentEntity) -> Result<(), StorageError>;

    /// Persist one translation together with its metadata.
    fn save_translation(&self, translation: &Translation) -> Result<(), StorageError>;
}

/// Registry of entity types and their storage.
pub trait EntityTypeManager: Send + Sync {
    fn definitions(&self) -> Result<BTreeMap<String, EntityTypeDefinition>, StorageError>;

    /// Get the storage for an entity type.
    ///
    /// Fails when the type is unknown or its storage handler is missing or
    /// unsupported.
    fn storage(&self, entity_type_id: &str) -> Result<Box<dyn EntityStorage + '_>, StorageError>;
}
