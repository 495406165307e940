//! Switching the site default language.
//!
//! The run is linear and not transactional:
//!
//! 1. Resolve the target language, creating it when missing
//! 2. Point the in-memory default at it, persist `system.site:default_langcode`
//!    and reset the language manager
//! 3. Retag every content entity still tagged with the previous default, and
//!    point its translations' source language at the new default
//!
//! Once step 2 has run there is no way back: failures while retagging are
//! logged per entity type and the run carries on with the next type.

use crate::content_translation::ContentTranslationManager;
use crate::entity::{ContentEntity, EntityStorage, EntityTypeDefinition, EntityTypeManager};
use crate::error::{MigrationError, StorageError};
use crate::extension::{ModuleHandler, CONTENT_TRANSLATION};
use crate::i18n::{Direction, Language, LanguageDefault, LanguageManager, LanguageStore};
use crate::system_config::{ConfigFactory, DEFAULT_LANGCODE, SYSTEM_SITE};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Arguments of a `set-default` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDefaultLanguage {
    pub langcode: String,
    /// Name used only when the language has to be created
    pub name: String,
    /// Raw direction token, normalized before use
    pub direction: Option<String>,
}

impl SetDefaultLanguage {
    pub fn new(langcode: &str, name: &str) -> Self {
        Self {
            langcode: langcode.to_string(),
            name: name.to_string(),
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: &str) -> Self {
        self.direction = Some(direction.to_string());
        self
    }
}

/// An entity type whose retagging stopped on a storage error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEntityType {
    pub entity_type: String,
    pub error: String,
}

/// What a completed run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub previous_default: String,
    pub new_default: String,
    pub language_created: bool,
    /// Retagged entities per entity type, including types that later failed
    pub retagged: BTreeMap<String, usize>,
    pub translations_updated: usize,
    pub failed_entity_types: Vec<FailedEntityType>,
}

impl MigrationReport {
    pub fn retagged_total(&self) -> usize {
        self.retagged.values().sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_entity_types.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The requested language already was the default; nothing changed.
    AlreadyDefault { langcode: String },
    /// The language did not exist and could not be saved; nothing changed.
    LanguageNotSaved { langcode: String, error: String },
    Completed(MigrationReport),
}

/// Moves a site to a new default language.
pub struct DefaultLanguageMigrator {
    language_store: Arc<dyn LanguageStore>,
    language_default: Arc<LanguageDefault>,
    language_manager: Arc<dyn LanguageManager>,
    config_factory: ConfigFactory,
    entity_type_manager: Arc<dyn EntityTypeManager>,
    translation_manager: Arc<dyn ContentTranslationManager>,
    module_handler: Arc<dyn ModuleHandler>,
}

impl DefaultLanguageMigrator {
    pub fn new(
        language_store: Arc<dyn LanguageStore>,
        language_default: Arc<LanguageDefault>,
        language_manager: Arc<dyn LanguageManager>,
        config_factory: ConfigFactory,
        entity_type_manager: Arc<dyn EntityTypeManager>,
        translation_manager: Arc<dyn ContentTranslationManager>,
        module_handler: Arc<dyn ModuleHandler>,
    ) -> Self {
        Self {
            language_store,
            language_default,
            language_manager,
            config_factory,
            entity_type_manager,
            translation_manager,
            module_handler,
        }
    }

    /// Make `request.langcode` the site default and retag content.
    ///
    /// User-facing messages are written to `out`; entity type failures go to
    /// the log only.
    pub fn set_default_language<W: Write>(
        &self,
        out: &mut W,
        request: &SetDefaultLanguage,
    ) -> Result<MigrationOutcome, MigrationError> {
        if request.langcode == self.language_default.get().id() {
            writeln!(out, "The language is already set as default.")?;
            return Ok(MigrationOutcome::AlreadyDefault {
                langcode: request.langcode.clone(),
            });
        }

        let previous_default = self.language_manager.default_language();

        let (target, language_created) = match self.language_store.load(&request.langcode)? {
            Some(existing) => (existing, false),
            None => match self.create_language(request) {
                Ok(created) => {
                    writeln!(out, "Created \"{}\" language.", request.langcode)?;
                    (created, true)
                }
                Err(e) => {
                    writeln!(
                        out,
                        "The language could not be saved due to the following error: {}",
                        e
                    )?;
                    return Ok(MigrationOutcome::LanguageNotSaved {
                        langcode: request.langcode.clone(),
                        error: e.to_string(),
                    });
                }
            },
        };

        self.switch_default(&target)?;
        info!(
            "Default language switched from \"{}\" to \"{}\"",
            previous_default.id(),
            target.id()
        );

        let mut report = MigrationReport {
            previous_default: previous_default.id().to_string(),
            new_default: target.id().to_string(),
            language_created,
            ..MigrationReport::default()
        };

        for (entity_type_id, definition) in self.entity_type_manager.definitions()? {
            if !definition.is_content() || !definition.has_langcode_key() {
                continue;
            }

            if let Err(e) = self.retag_entity_type(&definition, &previous_default, &target, &mut report) {
                error!(
                    entity_type = %entity_type_id,
                    plugin_error = e.is_plugin_error(),
                    "{}",
                    e
                );
                report.failed_entity_types.push(FailedEntityType {
                    entity_type: entity_type_id,
                    error: e.to_string(),
                });
            }
        }

        Ok(MigrationOutcome::Completed(report))
    }

    /// Build and save a new language. Any failure here aborts the run.
    fn create_language(&self, request: &SetDefaultLanguage) -> Result<Language, StorageError> {
        let direction = Direction::normalize(request.direction.as_deref());
        let language = self
            .language_store
            .create(&request.langcode, &request.name, direction)?;
        self.language_store.save(&language)?;
        Ok(language)
    }

    fn switch_default(&self, target: &Language) -> Result<(), MigrationError> {
        self.language_default.set(target.clone());

        self.config_factory
            .get_editable(SYSTEM_SITE)
            .and_then(|mut site| {
                site.set(DEFAULT_LANGCODE, target.id());
                site.save()
            })
            .map_err(|source| MigrationError::Config {
                config: SYSTEM_SITE.to_string(),
                source,
            })?;

        self.language_manager.reset();
        Ok(())
    }

    /// Retag the entities of one type. Any storage error abandons the rest of the type.
    fn retag_entity_type(
        &self,
        definition: &EntityTypeDefinition,
        previous_default: &Language,
        target: &Language,
        report: &mut MigrationReport,
    ) -> Result<(), StorageError> {
        let storage = self.entity_type_manager.storage(&definition.id)?;
        let entities = storage.load_multiple()?;
        debug!("Loaded {} \"{}\" entities", entities.len(), definition.id);

        for (_, mut entity) in entities {
            // Content authored in another language (asymmetric translations) keeps its tag
            if entity.langcode() != Some(previous_default.id()) {
                continue;
            }

            entity.set_langcode(target.id());
            storage.save(&entity)?;
            debug!("Retagged {} {} as \"{}\"", definition.id, entity.id, target.id());
            *report.retagged.entry(definition.id.clone()).or_default() += 1;

            report.translations_updated +=
                self.update_translations(definition, storage.as_ref(), &mut entity, target)?;
        }

        Ok(())
    }

    /// Point every translation of `entity` at `target` as its source language.
    ///
    /// Every existing translation in another configurable language is
    /// updated, whatever its previous source was.
    fn update_translations(
        &self,
        definition: &EntityTypeDefinition,
        storage: &dyn EntityStorage,
        entity: &mut ContentEntity,
        target: &Language,
    ) -> Result<usize, StorageError> {
        if !definition.is_translatable() || !self.module_handler.module_exists(CONTENT_TRANSLATION) {
            return Ok(0);
        }

        let langcodes: Vec<String> = if self.language_manager.is_multilingual()? {
            self.language_manager
                .languages()?
                .into_keys()
                .filter(|langcode| langcode != target.id())
                .collect()
        } else {
            Vec::new()
        };

        if entity.translation(target.id()).is_some() {
            debug!(
                "{} {} already has a \"{}\" translation, leaving its source as is",
                entity.entity_type,
                entity.id,
                target.id()
            );
        }

        let mut updated = 0;
        for langcode in langcodes {
            let Some(translation) = entity.translation_mut(&langcode) else {
                continue;
            };

            self.translation_manager
                .translation_metadata(translation)
                .set_source(target.id());
            storage.save_translation(translation)?;
            updated += 1;
        }

        if updated > 0 {
            debug!(
                "Updated {} translations of {} {}",
                updated, entity.entity_type, entity.id
            );
        }
        Ok(updated)
    }
}
