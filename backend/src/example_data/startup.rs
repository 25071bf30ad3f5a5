//! Seeds demo donors, donations and requests when the server boots.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use example_data::{RegistryError, SeedRegistry};
use mockable::DefaultClock;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::ports::SeedingResult;
use crate::domain::{ExampleDataSeedOutcome, ExampleDataSeeder, ExampleDataSeedingError};
use crate::example_data::config::ExampleDataSettings;
use crate::outbound::persistence::{DbPool, DieselExampleDataSeedRepository};

/// Why startup seeding could not run.
#[derive(Debug, Error)]
pub enum StartupSeedingError {
    /// The registry file is missing, unreadable or not UTF-8.
    #[error("cannot read seed registry {path}: {source}")]
    RegistryRead {
        /// Registry location that was tried.
        path: PathBuf,
        /// I/O failure reported by the filesystem.
        #[source]
        source: io::Error,
    },
    /// The registry is not valid JSON or breaks its own rules.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Generating or storing the seed failed.
    #[error(transparent)]
    Seeding(#[from] ExampleDataSeedingError),
    /// `EXAMPLE_DATA_SEED_NAME` was set to whitespace.
    #[error("seed name must not be blank")]
    EmptySeedName,
}

/// Apply the configured seed once per database.
///
/// Returns `None` when seeding is disabled or there is no database to seed.
/// A seed that was already applied is reported as
/// [`SeedingResult::AlreadySeeded`] and changes nothing.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::PathBuf;
///
/// use bloodbank::example_data::{ExampleDataSettings, seed_example_data_on_startup};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = ExampleDataSettings {
///     enabled: false,
///     seed_name: Some("city-drive".to_owned()),
///     user_count: None,
///     donation_count: None,
///     request_count: None,
///     registry_path: Some(PathBuf::from("fixtures/example-data/seeds.json")),
/// };
/// let outcome = seed_example_data_on_startup(&settings, None).await?;
/// assert!(outcome.is_none());
/// # Ok(())
/// # }
/// ```
pub async fn seed_example_data_on_startup(
    settings: &ExampleDataSettings,
    db_pool: Option<&DbPool>,
) -> Result<Option<ExampleDataSeedOutcome>, StartupSeedingError> {
    if !settings.enabled {
        info!(reason = "disabled", "example data seeding skipped");
        return Ok(None);
    }

    let seed_name = settings.seed_name().trim();
    if seed_name.is_empty() {
        return Err(StartupSeedingError::EmptySeedName);
    }

    let Some(db_pool) = db_pool else {
        warn!(
            seed_key = seed_name,
            "example data seeding enabled but no database is configured; skipping"
        );
        return Ok(None);
    };

    let registry_path = settings.registry_path();
    let registry = load_registry(&registry_path)?;

    let repository = DieselExampleDataSeedRepository::new(db_pool.clone());
    let seeder = ExampleDataSeeder::new(Arc::new(repository), Arc::new(DefaultClock));
    let outcome = seeder
        .seed_from_registry(&registry, seed_name, settings.count_overrides())
        .await?;

    info!(
        seed_key = %outcome.seed_key,
        applied = outcome.result == SeedingResult::Applied,
        user_count = outcome.user_count,
        donation_count = outcome.donation_count,
        request_count = outcome.request_count,
        "example data seeding finished"
    );

    Ok(Some(outcome))
}

fn load_registry(path: &Path) -> Result<SeedRegistry, StartupSeedingError> {
    let read_error = |source: io::Error| StartupSeedingError::RegistryRead {
        path: path.to_path_buf(),
        source,
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "registry path must name a file",
        ))
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let contents = Dir::open_ambient_dir(dir, ambient_authority())
        .and_then(|dir| dir.read_to_string(file_name))
        .map_err(read_error)?;
    Ok(SeedRegistry::from_json(&contents)?)
}
