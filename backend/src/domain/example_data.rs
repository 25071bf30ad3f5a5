//! Example data seeding orchestration.
//!
//! Converts deterministic example-data registry outputs into domain users,
//! ledger entries and grants, then delegates persistence to the seeding
//! repository port.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use example_data::{
    ExampleDataset, ExampleDonationSeed, ExampleRequestSeed, ExampleUserSeed, GenerationError,
    RegistryError, RequestStatusSeed, SeedDefinition, SeedRegistry, generate_example_data,
};
use mockable::Clock;
use thiserror::Error;

use crate::domain::ports::{
    ExampleDataSeedGrant, ExampleDataSeedRepository, ExampleDataSeedRepositoryError,
    ExampleDataSeedRequest, SeedingResult,
};
use crate::domain::{
    BloodGroup, BloodGroupParseError, Direction, Email, GrantStatus, LedgerEntry, LedgerSource,
    PhoneNumber, PhoneNumberError, Quantity, QuantityError, RequestGrant, Role, User, UserId,
    UserName, UserValidationError,
};

/// Result of attempting to apply example data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleDataSeedOutcome {
    /// Seed key used to record the run.
    pub seed_key: String,
    /// Number of users generated.
    pub user_count: usize,
    /// Number of donations generated.
    pub donation_count: usize,
    /// Number of grant requests generated.
    pub request_count: usize,
    /// Persistence outcome for the seed run.
    pub result: SeedingResult,
}

/// Per-run replacements for the counts a registry seed declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCountOverrides {
    /// Donor accounts to generate.
    pub users: Option<usize>,
    /// Donations to generate.
    pub donations: Option<usize>,
    /// Grant requests to generate.
    pub requests: Option<usize>,
}

impl SeedCountOverrides {
    fn apply(self, declared: &SeedDefinition) -> SeedDefinition {
        let mut seed = declared.clone();
        if let Some(count) = self.users {
            seed = seed.with_user_count(count);
        }
        if let Some(count) = self.donations {
            seed = seed.with_donation_count(count);
        }
        if let Some(count) = self.requests {
            seed = seed.with_request_count(count);
        }
        seed
    }
}

/// Errors raised while preparing or applying example data.
#[derive(Debug, Error)]
pub enum ExampleDataSeedingError {
    /// Seed registry lookups failed.
    #[error("seed registry error: {0}")]
    Registry(#[from] RegistryError),
    /// Dataset generation failed.
    #[error("example data generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// A generated name or email failed backend validation.
    #[error("generated user failed validation: {0}")]
    InvalidUser(#[from] UserValidationError),
    /// A generated blood group label is unknown.
    #[error("generated blood group failed validation: {0}")]
    InvalidBloodGroup(#[from] BloodGroupParseError),
    /// A generated phone failed validation.
    #[error("generated phone failed validation: {0}")]
    InvalidPhone(#[from] PhoneNumberError),
    /// A generated quantity is out of range.
    #[error("generated quantity failed validation: {0}")]
    InvalidQuantity(#[from] QuantityError),
    /// A granted request was generated without a ledger entry id.
    #[error("granted request {request_id} has no ledger entry id")]
    MissingLedgerEntry {
        /// Offending request.
        request_id: uuid::Uuid,
    },
    /// Seed value cannot be represented in the database.
    #[error("seed value {seed} exceeds maximum representable value")]
    SeedOverflow {
        /// Registry seed value.
        seed: u64,
    },
    /// Persistence adapter failed while seeding.
    #[error("example data persistence error: {0}")]
    Persistence(#[from] ExampleDataSeedRepositoryError),
}

/// Service that orchestrates example data seeding.
#[derive(Clone)]
pub struct ExampleDataSeeder<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ExampleDataSeeder<R> {
    /// Create a new seeder with the given persistence adapter and clock.
    ///
    /// Generated records carry day offsets; the clock anchors them.
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

impl<R> ExampleDataSeeder<R>
where
    R: ExampleDataSeedRepository,
{
    /// Apply example data for a named seed within the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ExampleDataSeedingError`] if registry lookup, generation,
    /// validation, or persistence fails.
    pub async fn seed_from_registry(
        &self,
        registry: &SeedRegistry,
        seed_name: &str,
        overrides: SeedCountOverrides,
    ) -> Result<ExampleDataSeedOutcome, ExampleDataSeedingError> {
        let seed_def = overrides.apply(registry.find_seed(seed_name)?);
        let seed_value = seed_def.seed();
        let seed = i64::try_from(seed_value)
            .map_err(|_| ExampleDataSeedingError::SeedOverflow { seed: seed_value })?;

        let dataset = generate_example_data(&seed_def)?;
        let request = convert_dataset(seed_def.name(), seed, dataset, self.clock.utc())?;
        let user_count = request.users.len();
        let donation_count = request.donations.len();
        let request_count = request.grants.len();

        let result = self.repository.seed_example_data(request).await?;

        Ok(ExampleDataSeedOutcome {
            seed_key: seed_def.name().to_owned(),
            user_count,
            donation_count,
            request_count,
            result,
        })
    }
}

fn convert_dataset(
    seed_key: &str,
    seed: i64,
    dataset: ExampleDataset,
    now: DateTime<Utc>,
) -> Result<ExampleDataSeedRequest, ExampleDataSeedingError> {
    let users = dataset
        .users
        .into_iter()
        .map(|seed_user| convert_user(seed_user, now))
        .collect::<Result<Vec<_>, _>>()?;
    let donations = dataset
        .donations
        .into_iter()
        .map(|donation| convert_donation(donation, now))
        .collect::<Result<Vec<_>, _>>()?;
    let grants = dataset
        .requests
        .into_iter()
        .map(|request| convert_request(request, now))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExampleDataSeedRequest {
        seed_key: seed_key.to_owned(),
        seed,
        users,
        donations,
        grants,
    })
}

fn days_before(now: DateTime<Utc>, days_ago: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days_ago))
}

fn convert_user(
    seed_user: ExampleUserSeed,
    now: DateTime<Utc>,
) -> Result<User, ExampleDataSeedingError> {
    let created_at = days_before(now, seed_user.days_ago);
    Ok(User {
        id: UserId::from_uuid(seed_user.id),
        name: UserName::new(seed_user.name)?,
        email: Email::new(seed_user.email)?,
        phone: Some(PhoneNumber::new(seed_user.phone)?),
        blood_group: seed_user.blood_group.parse::<BloodGroup>()?,
        medical_history: None,
        profile_image: None,
        role: Role::Regular,
        created_at,
        updated_at: created_at,
    })
}

fn convert_donation(
    donation: ExampleDonationSeed,
    now: DateTime<Utc>,
) -> Result<LedgerEntry, ExampleDataSeedingError> {
    Ok(LedgerEntry {
        id: donation.id,
        user_id: UserId::from_uuid(donation.user_id),
        direction: Direction::In,
        blood_group: donation.blood_group.parse::<BloodGroup>()?,
        quantity: Quantity::new(i64::from(donation.quantity))?,
        phone: Some(PhoneNumber::new(donation.phone)?),
        source: Some(LedgerSource::Donation),
        request_grant_id: None,
        created_at: days_before(now, donation.days_ago),
    })
}

fn convert_request(
    request: ExampleRequestSeed,
    now: DateTime<Utc>,
) -> Result<ExampleDataSeedGrant, ExampleDataSeedingError> {
    let created_at = days_before(now, request.days_ago);
    let (status, revision) = match request.status {
        RequestStatusSeed::Pending => (GrantStatus::Pending, 0),
        RequestStatusSeed::Granted => (GrantStatus::Granted, 1),
    };
    let grant = RequestGrant {
        id: request.id,
        user_id: UserId::from_uuid(request.user_id),
        name: UserName::new(request.name)?,
        phone: PhoneNumber::new(request.phone)?,
        blood_group: request.blood_group.parse::<BloodGroup>()?,
        quantity: Quantity::new(i64::from(request.quantity))?,
        status,
        ledger_entry_id: request.ledger_entry_id,
        revision,
        created_at,
        updated_at: created_at,
    };

    let entry = match (status, grant.ledger_entry_id) {
        (GrantStatus::Granted, Some(entry_id)) => Some(LedgerEntry {
            id: entry_id,
            user_id: grant.user_id,
            direction: Direction::Out,
            blood_group: grant.blood_group,
            quantity: grant.quantity,
            phone: Some(grant.phone.clone()),
            source: Some(LedgerSource::Request),
            request_grant_id: Some(grant.id),
            created_at,
        }),
        (GrantStatus::Granted, None) => {
            return Err(ExampleDataSeedingError::MissingLedgerEntry {
                request_id: grant.id,
            });
        }
        _ => None,
    };

    Ok(ExampleDataSeedGrant { grant, entry })
}

#[cfg(test)]
mod tests {
    //! Unit tests for example data seeding orchestration.

    use super::*;
    use crate::domain::ports::MockExampleDataSeedRepository;
    use crate::domain::service_test_helpers::{fixture_clock, fixture_timestamp};
    use rstest::rstest;

    const REGISTRY_JSON: &str = r#"{
        "version": 1,
        "seeds": [
            {"name": "city-drive", "seed": 42, "userCount": 4, "donationCount": 6, "requestCount": 5},
            {"name": "too-big", "seed": 18446744073709551615, "userCount": 1}
        ]
    }"#;

    fn registry() -> SeedRegistry {
        SeedRegistry::from_json(REGISTRY_JSON).expect("registry should parse")
    }

    fn request_invariants_hold(request: &ExampleDataSeedRequest) -> bool {
        request.grants.iter().all(|seeded| {
            let linked = seeded.entry.as_ref().map(|entry| entry.id);
            let entry_points_back = seeded
                .entry
                .as_ref()
                .is_none_or(|entry| entry.request_grant_id == Some(seeded.grant.id));
            linked == seeded.grant.ledger_entry_id
                && seeded.grant.is_materialized() == (seeded.grant.status == GrantStatus::Granted)
                && entry_points_back
        })
    }

    #[rstest]
    #[tokio::test]
    async fn seed_applies_for_new_seed() {
        let mut repo = MockExampleDataSeedRepository::new();
        repo.expect_seed_example_data()
            .withf(|request| {
                request.seed_key == "city-drive"
                    && request.seed == 42
                    && request.users.len() == 4
                    && request.donations.len() == 6
                    && request.grants.len() == 5
                    && request_invariants_hold(request)
            })
            .times(1)
            .return_once(|_| Ok(SeedingResult::Applied));

        let seeder = ExampleDataSeeder::new(Arc::new(repo), fixture_clock());
        let outcome = seeder
            .seed_from_registry(&registry(), "city-drive", SeedCountOverrides::default())
            .await
            .expect("seed succeeds");

        assert_eq!(outcome.result, SeedingResult::Applied);
        assert_eq!(outcome.user_count, 4);
        assert_eq!(outcome.donation_count, 6);
        assert_eq!(outcome.seed_key, "city-drive");
    }

    #[rstest]
    #[tokio::test]
    async fn generated_timestamps_precede_the_clock() {
        let mut repo = MockExampleDataSeedRepository::new();
        repo.expect_seed_example_data()
            .withf(|request| {
                let now = fixture_timestamp();
                request.users.iter().all(|u| u.created_at < now)
                    && request.donations.iter().all(|d| d.created_at < now)
            })
            .times(1)
            .return_once(|_| Ok(SeedingResult::Applied));

        let seeder = ExampleDataSeeder::new(Arc::new(repo), fixture_clock());
        seeder
            .seed_from_registry(&registry(), "city-drive", SeedCountOverrides::default())
            .await
            .expect("seed succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn seed_skips_when_already_seeded() {
        let mut repo = MockExampleDataSeedRepository::new();
        repo.expect_seed_example_data()
            .times(1)
            .return_once(|_| Ok(SeedingResult::AlreadySeeded));

        let seeder = ExampleDataSeeder::new(Arc::new(repo), fixture_clock());
        let outcome = seeder
            .seed_from_registry(&registry(), "city-drive", SeedCountOverrides::default())
            .await
            .expect("seed succeeds");

        assert_eq!(outcome.result, SeedingResult::AlreadySeeded);
    }

    #[rstest]
    #[case(SeedCountOverrides { users: Some(2), ..SeedCountOverrides::default() }, (2, 6, 5))]
    #[case(SeedCountOverrides { donations: Some(1), ..SeedCountOverrides::default() }, (4, 1, 5))]
    #[case(SeedCountOverrides { requests: Some(0), ..SeedCountOverrides::default() }, (4, 6, 0))]
    #[tokio::test]
    async fn count_overrides_replace_registry_counts(
        #[case] overrides: SeedCountOverrides,
        #[case] expected: (usize, usize, usize),
    ) {
        let mut repo = MockExampleDataSeedRepository::new();
        repo.expect_seed_example_data()
            .times(1)
            .return_once(|_| Ok(SeedingResult::Applied));

        let seeder = ExampleDataSeeder::new(Arc::new(repo), fixture_clock());
        let outcome = seeder
            .seed_from_registry(&registry(), "city-drive", overrides)
            .await
            .expect("seed succeeds");

        assert_eq!(
            (
                outcome.user_count,
                outcome.donation_count,
                outcome.request_count
            ),
            expected
        );
    }

    #[rstest]
    #[tokio::test]
    async fn seed_rejects_unknown_seed() {
        let seeder = ExampleDataSeeder::new(
            Arc::new(MockExampleDataSeedRepository::new()),
            fixture_clock(),
        );
        let error = seeder
            .seed_from_registry(&registry(), "missing-seed", SeedCountOverrides::default())
            .await
            .expect_err("missing seed should error");

        assert!(matches!(error, ExampleDataSeedingError::Registry(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn seed_overflow_is_rejected() {
        let mut repo = MockExampleDataSeedRepository::new();
        repo.expect_seed_example_data().times(0);

        let seeder = ExampleDataSeeder::new(Arc::new(repo), fixture_clock());
        let error = seeder
            .seed_from_registry(&registry(), "too-big", SeedCountOverrides::default())
            .await
            .expect_err("overflow should be rejected");

        assert!(matches!(
            error,
            ExampleDataSeedingError::SeedOverflow { seed } if seed == u64::MAX
        ));
    }

    #[rstest]
    fn granted_request_without_entry_id_is_rejected() {
        let request = ExampleRequestSeed {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            name: "Ada Lovelace".to_owned(),
            phone: "9000000001".to_owned(),
            blood_group: "A-".to_owned(),
            quantity: 20,
            status: RequestStatusSeed::Granted,
            ledger_entry_id: None,
            days_ago: 3,
        };

        let result = convert_request(request, fixture_timestamp());
        assert!(matches!(
            result,
            Err(ExampleDataSeedingError::MissingLedgerEntry { .. })
        ));
    }

    #[rstest]
    fn unknown_blood_group_is_rejected() {
        let donation = ExampleDonationSeed {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            blood_group: "C+".to_owned(),
            quantity: 10,
            phone: "9000000001".to_owned(),
            days_ago: 1,
        };

        assert!(matches!(
            convert_donation(donation, fixture_timestamp()),
            Err(ExampleDataSeedingError::InvalidBloodGroup(_))
        ));
    }
}
