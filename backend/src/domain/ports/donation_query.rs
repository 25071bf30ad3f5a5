//! Driving port for the caller's donation dashboard.

use async_trait::async_trait;

use crate::domain::{DonationSummary, Error, Principal};

/// Domain use-case port for donation reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationQuery: Send + Sync {
    /// Summarise the caller's donations.
    async fn donation_summary(&self, principal: &Principal) -> Result<DonationSummary, Error>;
}
