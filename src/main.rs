use anyhow::Result;
use change_default_language::cli::Cli;
use change_default_language::config::Config;
use change_default_language::migrator::MigrationOutcome;
use change_default_language::site::Site;
use clap::Parser;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env file (ignored when not present)
    let _ = dotenvy::dotenv();

    // Initialize logging on stderr so command output stays on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("change_default_language=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let site = Site::open(&config)?;

    let request = cli.set_default_request();
    info!("Setting default language to \"{}\"", request.langcode);

    let outcome = site
        .migrator()
        .set_default_language(&mut std::io::stdout().lock(), &request)?;

    debug!("Outcome: {}", serde_json::to_string(&outcome)?);

    match &outcome {
        MigrationOutcome::AlreadyDefault { .. } => {}
        MigrationOutcome::LanguageNotSaved { langcode, .. } => {
            warn!("Language \"{}\" was not saved, nothing changed", langcode);
        }
        MigrationOutcome::Completed(report) => {
            info!(
                "Retagged {} entities and {} translations from \"{}\" to \"{}\"",
                report.retagged_total(),
                report.translations_updated,
                report.previous_default,
                report.new_default
            );
            if report.has_failures() {
                warn!(
                    "{} entity types could not be updated",
                    report.failed_entity_types.len()
                );
            }
        }
    }

    Ok(())
}
