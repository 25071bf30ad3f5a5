//! Driving port for recording donations.

use async_trait::async_trait;

use crate::domain::{DonationDraft, Error, LedgerEntry, Principal};

/// Domain use-case port for donation ingestion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationCommand: Send + Sync {
    /// Append an `IN` entry for the caller and return it.
    async fn record_donation(
        &self,
        principal: &Principal,
        draft: DonationDraft,
    ) -> Result<LedgerEntry, Error>;
}
