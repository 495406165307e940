//! Change a site's default language.
//!
//! The [`migrator::DefaultLanguageMigrator`] switches the default language and
//! retags content authored in the previous default. It works against the
//! collaborator traits in [`i18n`], [`entity`], [`system_config`],
//! [`content_translation`] and [`extension`]; [`db::Database`] implements them
//! on SQLite and [`site::Site`] wires everything together.

pub mod cli;
pub mod config;
pub mod content_translation;
pub mod db;
pub mod entity;
pub mod error;
pub mod extension;
pub mod i18n;
pub mod migrator;
pub mod site;
pub mod system_config;
