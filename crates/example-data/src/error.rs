//! Failures surfaced by the registry loader and the dataset generator.

use std::path::PathBuf;

use thiserror::Error;

/// A seed registry that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The file could not be opened or read.
    #[error("cannot read seed registry '{path}': {message}")]
    Read {
        /// File that was tried.
        path: PathBuf,
        /// Operating system error text.
        message: String,
    },

    /// The document is not valid JSON, or a required field is missing.
    #[error("seed registry is not valid JSON: {message}")]
    Parse {
        /// serde_json error text, including line and column.
        message: String,
    },

    /// The `version` field names a format this crate does not read.
    #[error("seed registry version {actual} is not supported (expected {expected})")]
    UnsupportedVersion {
        /// Version this crate reads.
        expected: u32,
        /// Version found in the file.
        actual: u32,
    },

    /// `seeds` is an empty array.
    #[error("seed registry defines no seeds")]
    EmptySeeds,

    /// A seed `name` is blank.
    #[error("seed names must not be blank")]
    BlankSeedName,

    /// Two seeds share a name.
    #[error("seed '{name}' is defined more than once")]
    DuplicateSeedName {
        /// The repeated name.
        name: String,
    },

    /// No seed has the requested name.
    #[error("no seed named '{name}' in the registry")]
    SeedNotFound {
        /// Name that was looked up.
        name: String,
    },
}

/// A dataset that cannot be generated from a seed definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The faker kept producing names the backend would reject.
    #[error("no valid donor name after {max_attempts} attempts")]
    NameGenerationFailed {
        /// Attempts made before giving up.
        max_attempts: usize,
    },

    /// Donations or requests were asked for without any donors to own them.
    #[error("cannot generate {donation_count} donations and {request_count} requests without users")]
    NoUsers {
        /// Requested donations.
        donation_count: usize,
        /// Requested blood requests.
        request_count: usize,
    },
}
