//! Deterministic dataset generation from seed definitions.
//!
//! The same seed definition always produces identical output.

use fake::Fake;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::error::GenerationError;
use crate::registry::SeedDefinition;
use crate::seed::{
    ExampleDataset, ExampleDonationSeed, ExampleRequestSeed, ExampleUserSeed, RequestStatusSeed,
};
use crate::validation::{BLOOD_GROUPS, NAME_MAX, is_valid_person_name};

/// Maximum number of attempts to generate a valid name.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Oldest generated account, in days.
const MAX_ACCOUNT_AGE_DAYS: u32 = 60;

/// Oldest generated donation or request, in days.
const MAX_ACTIVITY_AGE_DAYS: u32 = 45;

/// Donation size range, in units.
const DONATION_UNITS: std::ops::RangeInclusive<u8> = 10..=60;

/// Request size range, in units.
const REQUEST_UNITS: std::ops::RangeInclusive<u8> = 5..=40;

/// Generates a dataset from a seed definition.
///
/// Uses the seed's `seed` value to initialise a deterministic RNG. The
/// generated data has:
///
/// - Users with unique emails, valid names, ten-digit phones and a blood group
/// - Donations owned by generated users, in the donor's own blood group
/// - Requests owned by generated users, roughly half of them granted; granted
///   requests carry the id of their `OUT` ledger entry
///
/// # Errors
///
/// Returns [`GenerationError`] if name generation fails after maximum retries
/// or donations/requests are requested without any users.
///
/// # Example
///
/// ```
/// use example_data::{SeedDefinition, generate_example_data};
///
/// let seed_def = SeedDefinition::new("test", 42, 3, 4, 2);
/// let first = generate_example_data(&seed_def).expect("generated");
/// let second = generate_example_data(&seed_def).expect("generated");
/// assert_eq!(first, second);
/// ```
pub fn generate_example_data(seed_def: &SeedDefinition) -> Result<ExampleDataset, GenerationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed_def.seed());

    let users = (0..seed_def.user_count())
        .map(|index| generate_user(&mut rng, index))
        .collect::<Result<Vec<_>, _>>()?;

    if users.is_empty() && (seed_def.donation_count() > 0 || seed_def.request_count() > 0) {
        return Err(GenerationError::NoUsers {
            donation_count: seed_def.donation_count(),
            request_count: seed_def.request_count(),
        });
    }

    let mut donations = Vec::with_capacity(seed_def.donation_count());
    for _ in 0..seed_def.donation_count() {
        if let Some(donor) = users.choose(&mut rng) {
            donations.push(generate_donation(&mut rng, donor));
        }
    }

    let mut requests = Vec::with_capacity(seed_def.request_count());
    for _ in 0..seed_def.request_count() {
        if let Some(requester) = users.choose(&mut rng) {
            requests.push(generate_request(&mut rng, requester));
        }
    }

    Ok(ExampleDataset {
        users,
        donations,
        requests,
    })
}

fn generate_user(rng: &mut ChaCha8Rng, index: usize) -> Result<ExampleUserSeed, GenerationError> {
    let id = Uuid::from_u128(rng.random());
    let (first, last) = generate_name(rng)?;
    let email = format!(
        "{}.{}{}@example.com",
        email_part(&first),
        email_part(&last),
        index + 1
    );

    Ok(ExampleUserSeed {
        id,
        name: format!("{first} {last}"),
        email,
        phone: generate_phone(rng),
        blood_group: pick_blood_group(rng).to_owned(),
        days_ago: rng.random_range(1..=MAX_ACCOUNT_AGE_DAYS),
    })
}

fn generate_donation(rng: &mut ChaCha8Rng, donor: &ExampleUserSeed) -> ExampleDonationSeed {
    ExampleDonationSeed {
        id: Uuid::from_u128(rng.random()),
        user_id: donor.id,
        blood_group: donor.blood_group.clone(),
        quantity: rng.random_range(DONATION_UNITS),
        phone: donor.phone.clone(),
        days_ago: rng.random_range(1..=MAX_ACTIVITY_AGE_DAYS),
    }
}

fn generate_request(rng: &mut ChaCha8Rng, requester: &ExampleUserSeed) -> ExampleRequestSeed {
    let id = Uuid::from_u128(rng.random());
    let blood_group = pick_blood_group(rng).to_owned();
    let quantity = rng.random_range(REQUEST_UNITS);
    let (status, ledger_entry_id) = if rng.random_bool(0.5) {
        (RequestStatusSeed::Granted, Some(Uuid::from_u128(rng.random())))
    } else {
        (RequestStatusSeed::Pending, None)
    };

    ExampleRequestSeed {
        id,
        user_id: requester.id,
        name: requester.name.clone(),
        phone: requester.phone.clone(),
        blood_group,
        quantity,
        status,
        ledger_entry_id,
        days_ago: rng.random_range(1..=MAX_ACTIVITY_AGE_DAYS),
    }
}

/// Generates a first and last name whose combination passes validation.
fn generate_name(rng: &mut ChaCha8Rng) -> Result<(String, String), GenerationError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let first: String = FirstName(EN).fake_with_rng(rng);
        let last: String = LastName(EN).fake_with_rng(rng);
        let candidate = format!("{first} {last}");

        if candidate.chars().count() <= NAME_MAX && is_valid_person_name(&candidate) {
            return Ok((first, last));
        }
    }

    Err(GenerationError::NameGenerationFailed {
        max_attempts: MAX_NAME_ATTEMPTS,
    })
}

fn email_part(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn generate_phone(rng: &mut ChaCha8Rng) -> String {
    format!("9{:09}", rng.random_range(0..1_000_000_000_u32))
}

fn pick_blood_group(rng: &mut ChaCha8Rng) -> &'static str {
    BLOOD_GROUPS.choose(rng).copied().unwrap_or("O-")
}
