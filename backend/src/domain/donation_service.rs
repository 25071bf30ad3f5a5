//! Donation ingestion and the donor dashboard.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{DonationCommand, DonationQuery, LedgerRepository, LedgerRepositoryError};
use crate::domain::{Direction, DonationDraft, DonationSummary, Error, LedgerEntry, Principal};

fn map_repository_error(error: LedgerRepositoryError) -> Error {
    match error {
        LedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger repository unavailable: {message}"))
        }
        LedgerRepositoryError::Query { message } => {
            Error::internal(format!("ledger repository error: {message}"))
        }
    }
}

/// Donation service implementing the donation driving ports.
#[derive(Clone)]
pub struct DonationService<R> {
    ledger: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> DonationService<R> {
    /// Create the service over a ledger repository.
    pub fn new(ledger: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }
}

#[async_trait]
impl<R> DonationCommand for DonationService<R>
where
    R: LedgerRepository,
{
    async fn record_donation(
        &self,
        principal: &Principal,
        draft: DonationDraft,
    ) -> Result<LedgerEntry, Error> {
        let entry = LedgerEntry::donation(*principal.user_id(), draft, self.clock.utc());
        self.ledger
            .append(&entry)
            .await
            .map_err(map_repository_error)?;

        info!(
            entry_id = %entry.id,
            user_id = %entry.user_id,
            blood_group = entry.blood_group.as_str(),
            quantity = entry.quantity.get(),
            "donation recorded"
        );
        Ok(entry)
    }
}

#[async_trait]
impl<R> DonationQuery for DonationService<R>
where
    R: LedgerRepository,
{
    async fn donation_summary(&self, principal: &Principal) -> Result<DonationSummary, Error> {
        let entries = self
            .ledger
            .list_for_user(principal.user_id(), Direction::In)
            .await
            .map_err(map_repository_error)?;
        Ok(DonationSummary::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockLedgerRepository;
    use crate::domain::service_test_helpers::{donor, fixture_clock, fixture_timestamp};
    use crate::domain::{BloodGroup, ErrorCode, LedgerSource, PhoneNumber, Quantity};
    use mockall::predicate::eq;

    fn draft(group: BloodGroup, units: i64) -> DonationDraft {
        DonationDraft {
            blood_group: group,
            quantity: Quantity::new(units).expect("quantity"),
            phone: PhoneNumber::new("9000000001").expect("phone"),
        }
    }

    #[tokio::test]
    async fn donations_are_appended_for_the_caller() {
        let principal = donor();
        let caller = *principal.user_id();

        let mut ledger = MockLedgerRepository::new();
        ledger
            .expect_append()
            .withf(move |entry| {
                entry.user_id == caller
                    && entry.direction == Direction::In
                    && entry.source == Some(LedgerSource::Donation)
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = DonationService::new(Arc::new(ledger), fixture_clock());
        let entry = service
            .record_donation(&principal, draft(BloodGroup::OPositive, 50))
            .await
            .expect("donation");

        assert_eq!(entry.quantity.get(), 50);
        assert_eq!(entry.created_at, fixture_timestamp());
    }

    #[tokio::test]
    async fn append_failures_surface_as_internal_errors() {
        let mut ledger = MockLedgerRepository::new();
        ledger
            .expect_append()
            .times(1)
            .return_once(|_| Err(LedgerRepositoryError::query("constraint violated")));

        let service = DonationService::new(Arc::new(ledger), fixture_clock());
        let err = service
            .record_donation(&donor(), draft(BloodGroup::APositive, 1))
            .await
            .expect_err("append fails");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn summary_reads_only_incoming_entries_for_the_caller() {
        let principal = donor();
        let entry = LedgerEntry::donation(
            *principal.user_id(),
            draft(BloodGroup::OPositive, 50),
            fixture_timestamp(),
        );

        let mut ledger = MockLedgerRepository::new();
        ledger
            .expect_list_for_user()
            .with(eq(*principal.user_id()), eq(Direction::In))
            .times(1)
            .return_once(move |_, _| Ok(vec![entry]));

        let service = DonationService::new(Arc::new(ledger), fixture_clock());
        let summary = service
            .donation_summary(&principal)
            .await
            .expect("summary");

        assert_eq!(summary.summary.total_quantity_of_donations, 50);
        assert_eq!(summary.summary.total_donations_count, 1);
    }
}
