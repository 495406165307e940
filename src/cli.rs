//! Command line interface.
//!
//! Usage:
//!   change-default-language language set-default es Spanish
//!   change-default-language language:set:default ar Arabic rtl
//!   change-default-language lsd ar Arabic rtl

use crate::migrator::SetDefaultLanguage;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "change-default-language")]
#[command(about = "Change the site default language and retag existing content")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Language administration
    #[command(subcommand)]
    Language(LanguageCommand),

    /// Set the default language (same as `language set-default`)
    #[command(name = "language:set:default", visible_alias = "lsd")]
    SetDefault(SetDefaultArgs),
}

#[derive(Subcommand, Debug)]
pub enum LanguageCommand {
    /// Set the default language, creating it when missing
    SetDefault(SetDefaultArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SetDefaultArgs {
    /// Language code.
    pub langcode: String,

    /// Language name.
    pub name: String,

    /// Language direction (ltr or rtl). Anything else means ltr.
    pub direction: Option<String>,
}

impl Cli {
    /// The set-default request, whichever spelling of the command was used.
    pub fn set_default_request(&self) -> SetDefaultLanguage {
        let args = match &self.command {
            Command::Language(LanguageCommand::SetDefault(args)) | Command::SetDefault(args) => args,
        };

        SetDefaultLanguage {
            langcode: args.langcode.clone(),
            name: args.name.clone(),
            direction: args.direction.clone(),
        }
    }
}
