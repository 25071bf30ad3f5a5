//! Blood vocabulary: ABO/Rh groups, unit quantities and contact phones.
//!
//! These value types are validated once at the boundary so services and
//! adapters can rely on them without re-checking.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One of the eight ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    /// A positive.
    #[serde(rename = "A+")]
    APositive,
    /// A negative.
    #[serde(rename = "A-")]
    ANegative,
    /// AB positive.
    #[serde(rename = "AB+")]
    AbPositive,
    /// AB negative.
    #[serde(rename = "AB-")]
    AbNegative,
    /// B positive.
    #[serde(rename = "B+")]
    BPositive,
    /// B negative.
    #[serde(rename = "B-")]
    BNegative,
    /// O positive.
    #[serde(rename = "O+")]
    OPositive,
    /// O negative.
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    /// All groups in reporting order.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::BPositive,
        Self::BNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Wire and storage representation, e.g. `"AB-"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string is not one of the eight blood groups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blood group: {value}")]
pub struct BloodGroupParseError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for BloodGroup {
    type Err = BloodGroupParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| BloodGroupParseError {
                value: s.to_owned(),
            })
    }
}

/// Smallest number of units a donation or request may carry.
pub const QUANTITY_MIN: i64 = 1;
/// Largest number of units a donation or request may carry.
pub const QUANTITY_MAX: i64 = 100;

/// Number of blood units, always within `1..=100`.
///
/// # Examples
/// ```
/// use bloodbank::domain::Quantity;
///
/// assert_eq!(Quantity::new(20).map(Quantity::get), Ok(20));
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quantity(u8);

/// Raised when a quantity falls outside `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    /// Fewer than one unit.
    #[error("quantity must be at least {QUANTITY_MIN}")]
    TooSmall,
    /// More than the per-transaction ceiling.
    #[error("quantity cannot exceed {QUANTITY_MAX}")]
    TooLarge,
}

impl Quantity {
    /// Validate a raw unit count.
    pub fn new(units: i64) -> Result<Self, QuantityError> {
        if units < QUANTITY_MIN {
            return Err(QuantityError::TooSmall);
        }
        u8::try_from(units)
            .ok()
            .filter(|value| i64::from(*value) <= QUANTITY_MAX)
            .map(Self)
            .ok_or(QuantityError::TooLarge)
    }

    /// Units as a plain integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let units = i64::deserialize(deserializer)?;
        Self::new(units).map_err(serde::de::Error::custom)
    }
}

/// Contact phone number: at least ten ASCII digits and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

/// Raised when a phone number is not at least ten digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("phone must be at least 10 digits")]
pub struct PhoneNumberError;

#[expect(
    clippy::expect_used,
    reason = "pattern is a literal covered by unit tests"
)]
fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{10,}$").expect("valid phone regex"))
}

impl PhoneNumber {
    /// Validate a phone number.
    ///
    /// # Examples
    /// ```
    /// use bloodbank::domain::PhoneNumber;
    ///
    /// assert!(PhoneNumber::new("9000000001").is_ok());
    /// assert!(PhoneNumber::new("+44 20 7946").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, PhoneNumberError> {
        let raw = raw.into();
        if phone_pattern().is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(PhoneNumberError)
        }
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
