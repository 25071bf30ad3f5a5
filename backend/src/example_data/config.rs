//! Startup seeding settings, read with OrthoConfig from `EXAMPLE_DATA_*`.
//!
//! Every count is optional; unset counts keep the value the registry seed
//! declares.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::SeedCountOverrides;

const DEFAULT_SEED_NAME: &str = "city-drive";
const BUNDLED_REGISTRY: [&str; 3] = ["fixtures", "example-data", "seeds.json"];

/// Which seed to apply at startup, and how big to make it.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EXAMPLE_DATA")]
pub struct ExampleDataSettings {
    /// Apply the seed at startup.
    #[ortho_config(default = false)]
    pub enabled: bool,
    /// Registry seed name; `city-drive` when unset.
    pub seed_name: Option<String>,
    /// Donor accounts to generate instead of the registry's `userCount`.
    pub user_count: Option<usize>,
    /// Donations to generate instead of the registry's `donationCount`.
    pub donation_count: Option<usize>,
    /// Requests to generate instead of the registry's `requestCount`.
    pub request_count: Option<usize>,
    /// Registry file; the bundled fixture when unset.
    pub registry_path: Option<PathBuf>,
}

impl ExampleDataSettings {
    /// Configured seed name, or the default.
    pub fn seed_name(&self) -> &str {
        self.seed_name.as_deref().unwrap_or(DEFAULT_SEED_NAME)
    }

    /// Configured registry path, or the registry shipped with the crate.
    pub fn registry_path(&self) -> PathBuf {
        self.registry_path.clone().unwrap_or_else(|| {
            BUNDLED_REGISTRY
                .iter()
                .fold(PathBuf::from(env!("CARGO_MANIFEST_DIR")), |path, part| {
                    path.join(part)
                })
        })
    }

    /// Count overrides to hand to the seeder.
    pub const fn count_overrides(&self) -> SeedCountOverrides {
        SeedCountOverrides {
            users: self.user_count,
            donations: self.donation_count,
            requests: self.request_count,
        }
    }
}
