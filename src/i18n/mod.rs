//! Site languages and the services around the default language.
//!
//! # Architecture
//!
//! - `language`: the `Language` value and its text `Direction`
//! - `manager`: `LanguageStore` persistence, the in-memory `LanguageDefault`
//!   pointer and the caching `LanguageManager`
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{ConfigurableLanguageManager, LanguageDefault, LanguageManager};
//!
//! let manager = ConfigurableLanguageManager::new(store, language_default);
//! let others: Vec<_> = manager.languages()?.into_keys().collect();
//! ```

mod language;
mod manager;

pub use language::{Direction, Language};
pub use manager::{ConfigurableLanguageManager, LanguageDefault, LanguageManager, LanguageStore};
