//! The JSON seed registry.
//!
//! A registry is a versioned list of named seeds. Each seed fixes the RNG seed
//! and how many donors, donations and requests to generate from it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::RegistryError;

/// Registry format version this crate reads.
const SUPPORTED_VERSION: u32 = 1;

/// Validated set of named seeds.
///
/// # Example
///
/// ```
/// use example_data::SeedRegistry;
///
/// let json = r#"{
///     "version": 1,
///     "seeds": [{"name": "test", "seed": 42, "userCount": 5}]
/// }"#;
///
/// let registry = SeedRegistry::from_json(json).expect("valid registry");
/// assert_eq!(registry.seeds().len(), 1);
/// assert_eq!(registry.seeds().first().map(|s| s.donation_count()), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRegistry {
    version: u32,
    seeds: Vec<SeedDefinition>,
}

/// Registry document before its invariants are checked.
#[derive(Debug, Deserialize)]
struct RegistryDocument {
    version: u32,
    seeds: Vec<SeedDefinition>,
}

impl TryFrom<RegistryDocument> for SeedRegistry {
    type Error = RegistryError;

    fn try_from(document: RegistryDocument) -> Result<Self, Self::Error> {
        let RegistryDocument { version, seeds } = document;
        if version != SUPPORTED_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: version,
            });
        }
        if seeds.is_empty() {
            return Err(RegistryError::EmptySeeds);
        }
        let mut names = HashSet::with_capacity(seeds.len());
        for seed in &seeds {
            if seed.name.trim().is_empty() {
                return Err(RegistryError::BlankSeedName);
            }
            if !names.insert(seed.name.as_str()) {
                return Err(RegistryError::DuplicateSeedName {
                    name: seed.name.clone(),
                });
            }
        }
        Ok(Self { version, seeds })
    }
}

impl SeedRegistry {
    /// Parse and validate a registry document.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Parse`] for malformed JSON or missing fields, and the
    /// remaining variants for documents that parse but break a rule: wrong
    /// version, no seeds, a blank name or a repeated name.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let document: RegistryDocument =
            serde_json::from_str(json).map_err(|e| RegistryError::Parse {
                message: e.to_string(),
            })?;
        Self::try_from(document)
    }

    /// Read and parse a registry file.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Read`] when the file cannot be read, otherwise as
    /// [`SeedRegistry::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path).map_err(|e| RegistryError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&contents)
    }

    /// Format version of the document.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Seeds in document order.
    #[must_use]
    pub fn seeds(&self) -> &[SeedDefinition] {
        &self.seeds
    }

    /// Look a seed up by its exact name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::SeedNotFound`] when no seed has that name.
    pub fn find_seed(&self, name: &str) -> Result<&SeedDefinition, RegistryError> {
        self.seeds
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RegistryError::SeedNotFound {
                name: name.to_owned(),
            })
    }
}

/// One named seed. Donation and request counts default to zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDefinition {
    name: String,
    seed: u64,
    user_count: usize,
    #[serde(default)]
    donation_count: usize,
    #[serde(default)]
    request_count: usize,
}

impl SeedDefinition {
    /// Build a definition in code, bypassing the registry.
    ///
    /// # Example
    ///
    /// ```
    /// use example_data::SeedDefinition;
    ///
    /// let seed = SeedDefinition::new("demo", 7, 20, 40, 25);
    /// assert_eq!(seed.request_count(), 25);
    /// ```
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        seed: u64,
        user_count: usize,
        donation_count: usize,
        request_count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            seed,
            user_count,
            donation_count,
            request_count,
        }
    }

    /// Replace the number of donors.
    #[must_use]
    pub fn with_user_count(mut self, user_count: usize) -> Self {
        self.user_count = user_count;
        self
    }

    /// Replace the number of donations.
    #[must_use]
    pub fn with_donation_count(mut self, donation_count: usize) -> Self {
        self.donation_count = donation_count;
        self
    }

    /// Replace the number of blood requests.
    #[must_use]
    pub fn with_request_count(mut self, request_count: usize) -> Self {
        self.request_count = request_count;
        self
    }

    /// Registry name of the seed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value fed to the ChaCha RNG.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Donors to generate.
    #[must_use]
    pub const fn user_count(&self) -> usize {
        self.user_count
    }

    /// `IN` ledger entries to generate.
    #[must_use]
    pub const fn donation_count(&self) -> usize {
        self.donation_count
    }

    /// Blood requests to generate.
    #[must_use]
    pub const fn request_count(&self) -> usize {
        self.request_count
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn registry() -> SeedRegistry {
        SeedRegistry::from_json(
            r#"{
                "version": 1,
                "seeds": [
                    {"name": "city-drive", "seed": 2026, "userCount": 20, "donationCount": 40, "requestCount": 25},
                    {"name": "quiet-week", "seed": 1234, "userCount": 5}
                ]
            }"#,
        )
        .expect("valid registry")
    }

    #[rstest]
    fn seeds_keep_document_order(registry: SeedRegistry) {
        let names: Vec<_> = registry.seeds().iter().map(SeedDefinition::name).collect();

        assert_eq!(registry.version(), 1);
        assert_eq!(names, ["city-drive", "quiet-week"]);
    }

    #[rstest]
    #[case("city-drive", (2026, 20, 40, 25))]
    #[case("quiet-week", (1234, 5, 0, 0))]
    fn lookups_return_the_declared_counts(
        registry: SeedRegistry,
        #[case] name: &str,
        #[case] expected: (u64, usize, usize, usize),
    ) {
        let seed = registry.find_seed(name).expect("seed found");

        assert_eq!(
            (seed.seed(), seed.user_count(), seed.donation_count(), seed.request_count()),
            expected
        );
    }

    #[rstest]
    fn unknown_names_are_reported(registry: SeedRegistry) {
        assert_eq!(
            registry.find_seed("winter-shortage"),
            Err(RegistryError::SeedNotFound {
                name: "winter-shortage".to_owned()
            })
        );
    }

    #[rstest]
    #[case::malformed_json("{\"version\": 1,")]
    #[case::missing_user_count(r#"{"version": 1, "seeds": [{"name": "a", "seed": 1}]}"#)]
    #[case::negative_count(r#"{"version": 1, "seeds": [{"name": "a", "seed": 1, "userCount": -2}]}"#)]
    fn undecodable_documents_are_parse_errors(#[case] json: &str) {
        assert!(matches!(
            SeedRegistry::from_json(json),
            Err(RegistryError::Parse { .. })
        ));
    }

    #[rstest]
    #[case::unsupported_version(
        r#"{"version": 2, "seeds": [{"name": "a", "seed": 1, "userCount": 1}]}"#,
        RegistryError::UnsupportedVersion { expected: 1, actual: 2 }
    )]
    #[case::empty_seeds(r#"{"version": 1, "seeds": []}"#, RegistryError::EmptySeeds)]
    #[case::blank_name(
        r#"{"version": 1, "seeds": [{"name": "  ", "seed": 1, "userCount": 1}]}"#,
        RegistryError::BlankSeedName
    )]
    #[case::duplicate_names(
        r#"{"version": 1, "seeds": [{"name": "a", "seed": 1, "userCount": 1}, {"name": "a", "seed": 2, "userCount": 1}]}"#,
        RegistryError::DuplicateSeedName { name: "a".to_owned() }
    )]
    fn rule_breaking_documents_are_rejected(#[case] json: &str, #[case] expected: RegistryError) {
        assert_eq!(SeedRegistry::from_json(json), Err(expected));
    }

    #[rstest]
    fn count_overrides_leave_the_rest_alone() {
        let seed = SeedDefinition::new("demo", 7, 20, 40, 25)
            .with_user_count(3)
            .with_request_count(0);

        assert_eq!(seed, SeedDefinition::new("demo", 7, 3, 40, 0));
    }
}
