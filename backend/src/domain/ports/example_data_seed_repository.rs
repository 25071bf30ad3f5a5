//! Driven port that writes a generated demo dataset.
//!
//! A seed is applied all-or-nothing and at most once per seed key.

use async_trait::async_trait;

use crate::domain::{LedgerEntry, RequestGrant, User};

use super::define_port_error;

define_port_error! {
    /// Failure while writing a seed run.
    pub enum ExampleDataSeedRepositoryError {
        /// The database could not be reached.
        Connection { message: String } => "seed store unavailable: {message}",
        /// An insert was rejected; the whole run was rolled back.
        Query { message: String } => "seed insert failed: {message}",
    }
}

/// Whether a seed run wrote anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedingResult {
    /// Seed was newly recorded and its data inserted.
    Applied,
    /// Seed key was already recorded; nothing was written.
    AlreadySeeded,
}

/// A seeded grant together with its materialized `OUT` entry.
///
/// `entry` is present exactly when the grant is `granted`, and the grant's
/// `ledger_entry_id` points at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleDataSeedGrant {
    /// Grant record.
    pub grant: RequestGrant,
    /// Linked ledger entry for granted requests.
    pub entry: Option<LedgerEntry>,
}

/// Everything one seed run inserts.
#[derive(Debug, Clone)]
pub struct ExampleDataSeedRequest {
    /// Seed name recorded in the seed run table.
    pub seed_key: String,
    /// RNG seed value used for deterministic generation.
    pub seed: i64,
    /// Generated accounts.
    pub users: Vec<User>,
    /// Generated `IN` entries.
    pub donations: Vec<LedgerEntry>,
    /// Generated grants.
    pub grants: Vec<ExampleDataSeedGrant>,
}

/// Applies a seed run inside one transaction.
///
/// The run record is claimed first; when its key already exists nothing else
/// is written and [`SeedingResult::AlreadySeeded`] is returned. Any failure
/// after the claim rolls the run back, record included.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExampleDataSeedRepository: Send + Sync {
    /// Claim `request.seed_key` and insert the generated rows.
    async fn seed_example_data(
        &self,
        request: ExampleDataSeedRequest,
    ) -> Result<SeedingResult, ExampleDataSeedRepositoryError>;
}
