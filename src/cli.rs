//! CLI helper functions

use crate::{
    batch::BatchWriter,
    client::FirestoreClient,
    config::SeedConfig,
    orchestrator::{Orchestrator, RunSummary},
    report::Reporter,
    seed::{CollectionTarget, EmbeddedSeed, SeedFile, SeedSource},
    store::{Datastore, InMemoryStore},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;

/// Pick the seed source: a seed file if configured, otherwise the built-in data
pub fn load_seed_source(config: &SeedConfig) -> Box<dyn SeedSource> {
    match &config.seed_file {
        Some(path) => {
            log::info!("Using seed file {}", path.display().bright_black());
            Box::new(SeedFile::new(path))
        }
        None => {
            log::info!("Using built-in seed data");
            Box::new(EmbeddedSeed)
        }
    }
}

/// Load the targets to write, in write order
pub fn load_targets(config: &SeedConfig) -> Result<Vec<CollectionTarget>> {
    let targets = load_seed_source(config)
        .list()
        .context("Failed to load seed data")?;
    for target in &targets {
        log::debug!("{} record(s) for '{}'", target.len(), target.name().cyan());
    }
    Ok(targets)
}

/// Build the Firestore client from configuration
pub fn load_firestore_client(config: &SeedConfig) -> Result<FirestoreClient> {
    let project_id = config
        .project_id
        .clone()
        .ok_or_else(|| eyre::eyre!("FIRESTORE_PROJECT_ID environment variable not set"))?;
    let url = config.rest_url()?;

    FirestoreClient::try_new(url, project_id, config.database.clone(), config.auth())
        .context("Failed to create Firestore client")
}

/// Run a population pass against `store`
pub async fn populate_store<D, R>(
    store: &D,
    targets: &[CollectionTarget],
    config: &SeedConfig,
    reporter: R,
) -> Result<RunSummary>
where
    D: Datastore + ?Sized,
    R: Reporter,
{
    let writer = BatchWriter::new(store).with_limit(config.batch_size)?;
    let mut orchestrator = Orchestrator::with_writer(writer, reporter).clear_first(config.clear);
    Ok(orchestrator.run(targets).await)
}

/// Seed the configured datastore
///
/// Errors returned from here are initialization failures: nothing has been
/// written yet. Per-collection write failures are inside the summary.
pub async fn populate<R: Reporter>(config: &SeedConfig, reporter: R) -> Result<RunSummary> {
    config.validate()?;
    let targets = load_targets(config)?;

    if config.clear {
        log::warn!("Existing documents will be deleted before writing");
    }

    if config.dry_run {
        log::info!("Dry run, writing to an in-memory store");
        let store = InMemoryStore::new();
        let summary = populate_store(&store, &targets, config, reporter).await?;
        for target in &targets {
            log::info!(
                "Dry run: '{}' would hold {} document(s)",
                target.name().cyan(),
                store.count(target.name())
            );
        }
        return Ok(summary);
    }

    log::info!("Connecting to Firestore...");
    let client = load_firestore_client(config)?;
    log::info!("Using {}", client.bright_black());
    log::info!("Batch size: {}", config.batch_size);

    populate_store(&client, &targets, config, reporter).await
}
