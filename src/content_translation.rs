//! Content translation metadata.
//!
//! Metadata lives on the translation itself; the manager hands out a wrapper
//! that knows which parts of a translation are metadata.

use crate::entity::Translation;

pub trait ContentTranslationManager: Send + Sync {
    fn translation_metadata<'t>(&self, translation: &'t mut Translation) -> TranslationMetadataWrapper<'t>;
}

/// Read/write access to the metadata of one translation.
pub struct TranslationMetadataWrapper<'t> {
    translation: &'t mut Translation,
}

impl<'t> TranslationMetadataWrapper<'t> {
    pub fn new(translation: &'t mut Translation) -> Self {
        Self { translation }
    }

    pub fn set_source(&mut self, langcode: &str) -> &mut Self {
        self.translation.metadata.source = Some(langcode.to_string());
        self
    }
}

/// Metadata manager for entities stored with metadata fields on each translation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldTranslationManager;

impl ContentTranslationManager for FieldTranslationManager {
    fn translation_metadata<'t>(&self, translation: &'t mut Translation) -> TranslationMetadataWrapper<'t> {
        TranslationMetadataWrapper::new(translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ContentEntity;

    fn german_translation() -> Translation {
        let entity = ContentEntity::new("node", "1", "Home").with_langcode("en");
        Translation::new(&entity, "de", "Startseite").with_source("fr")
    }

    #[test]
    fn test_set_source_overwrites_previous_source() {
        let mut translation = german_translation();

        FieldTranslationManager
            .translation_metadata(&mut translation)
            .set_source("es");

        assert_eq!(translation.metadata.source.as_deref(), Some("es"));
    }

    #[test]
    fn test_set_source_leaves_other_metadata() {
        let mut translation = german_translation();
        translation.metadata.outdated = true;

        FieldTranslationManager
            .translation_metadata(&mut translation)
            .set_source("es");

        assert!(translation.metadata.outdated);
        assert_eq!(translation.label, "Startseite");
    }
}
