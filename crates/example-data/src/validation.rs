//! Field rules mirroring backend constraints.
//!
//! Keeping these in sync with the backend's `UserName`, `PhoneNumber`,
//! `BloodGroup` and `Quantity` types ensures generated records are always
//! accepted when the backend converts them.

/// Blood group labels in the backend's canonical reporting order.
pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "AB+", "AB-", "B+", "B-", "O+", "O-"];

/// Maximum length of a person's name, in characters.
pub const NAME_MAX: usize = 100;

/// Minimum number of digits in a phone number.
pub const PHONE_MIN_DIGITS: usize = 10;

/// Smallest quantity of units per donation or request.
pub const QUANTITY_MIN: u8 = 1;

/// Largest quantity of units per donation or request.
pub const QUANTITY_MAX: u8 = 100;

/// Validates a person's name against backend constraints.
///
/// # Examples
///
/// ```
/// use example_data::is_valid_person_name;
///
/// assert!(is_valid_person_name("Ada Lovelace"));
/// assert!(!is_valid_person_name("   "));
/// ```
#[must_use]
pub fn is_valid_person_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed == name && name.chars().count() <= NAME_MAX
}

/// Validates a phone number: ASCII digits only, at least
/// [`PHONE_MIN_DIGITS`] of them.
///
/// # Examples
///
/// ```
/// use example_data::is_valid_phone;
///
/// assert!(is_valid_phone("9000000001"));
/// assert!(!is_valid_phone("900-000-0001"));
/// ```
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() >= PHONE_MIN_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}
