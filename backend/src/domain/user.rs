//! User accounts: identifiers, validated profile fields and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BloodGroup, PhoneNumber};

/// Maximum length of a person's name, in characters.
pub const USER_NAME_MAX: usize = 100;

/// Validation errors raised by user field constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier is not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The name is blank once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// The name exceeds [`USER_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// The email has no local part, no domain, or no `@`.
    #[error("email must look like local@domain")]
    InvalidEmail,
    /// The role is neither `admin` nor `regular`.
    #[error("role must be admin or regular")]
    InvalidRole,
}

/// Stable user identifier.
///
/// # Examples
/// ```
/// use bloodbank::domain::UserId;
///
/// let id: UserId = "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().expect("uuid");
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Allocate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person's name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Validate and normalise a name.
    ///
    /// # Examples
    /// ```
    /// use bloodbank::domain::UserName;
    ///
    /// assert_eq!(UserName::new("  Ada ").map(|n| n.to_string()), Ok("Ada".to_owned()));
    /// assert!(UserName::new("   ").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-cased email address used to match identities on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        match normalised.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(normalised))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account role. Only admins may act on grants, users and inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative capability.
    Admin,
    /// Donor or requester.
    #[default]
    Regular,
}

impl Role {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Regular => "regular",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "regular" => Ok(Self::Regular),
            _ => Err(UserValidationError::InvalidRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blood group assigned to accounts that have not filled in their profile.
pub const DEFAULT_BLOOD_GROUP: BloodGroup = BloodGroup::ONegative;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: UserName,
    /// Unique sign-in email.
    pub email: Email,
    /// Contact phone, once supplied.
    pub phone: Option<PhoneNumber>,
    /// Blood group.
    pub blood_group: BloodGroup,
    /// Free-text medical history.
    pub medical_history: Option<String>,
    /// Avatar URL.
    pub profile_image: Option<String>,
    /// Account role.
    pub role: Role,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last profile or role change.
    pub updated_at: DateTime<Utc>,
}

/// Identity asserted by the sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInIdentity {
    /// Verified email address.
    pub email: Email,
    /// Name reported by the identity provider.
    pub name: UserName,
    /// Optional avatar URL.
    pub profile_image: Option<String>,
}

impl User {
    /// Build the account created on a first sign-in.
    #[must_use]
    pub fn register(identity: SignInIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::random(),
            name: identity.name,
            email: identity.email,
            phone: None,
            blood_group: DEFAULT_BLOOD_GROUP,
            medical_history: None,
            profile_image: identity.profile_image,
            role: Role::Regular,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of the user-editable profile fields.
///
/// Fields left as `None` are untouched. Email and role are deliberately
/// absent: the former comes from the identity provider, the latter from
/// admins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<UserName>,
    /// New contact phone.
    pub phone: Option<PhoneNumber>,
    /// New medical history text.
    pub medical_history: Option<String>,
    /// New blood group.
    pub blood_group: Option<BloodGroup>,
    /// New avatar URL.
    pub profile_image: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.medical_history.is_none()
            && self.blood_group.is_none()
            && self.profile_image.is_none()
    }

    /// Apply the update to `user`, stamping `updated_at`.
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(history) = &self.medical_history {
            user.medical_history = Some(history.clone());
        }
        if let Some(group) = self.blood_group {
            user.blood_group = group;
        }
        if let Some(image) = &self.profile_image {
            user.profile_image = Some(image.clone());
        }
        user.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn identity() -> SignInIdentity {
        SignInIdentity {
            email: Email::new("Donor@Example.com").expect("email"),
            name: UserName::new("Demo Donor").expect("name"),
            profile_image: None,
        }
    }

    #[rstest]
    #[case("a@b.c", true)]
    #[case("  MIXED@Case.ORG ", true)]
    #[case("no-at-sign", false)]
    #[case("@domain", false)]
    #[case("local@", false)]
    #[case("a@b@c", false)]
    fn email_validation(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(Email::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn email_is_lower_cased() {
        let email = Email::new("  MIXED@Case.ORG ").expect("email");
        assert_eq!(email.as_ref(), "mixed@case.org");
    }

    #[rstest]
    fn long_names_are_rejected() {
        let name = "x".repeat(USER_NAME_MAX + 1);
        assert_eq!(
            UserName::new(name),
            Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX
            })
        );
    }

    #[rstest]
    #[case("admin", Ok(Role::Admin))]
    #[case("regular", Ok(Role::Regular))]
    #[case("Admin", Err(UserValidationError::InvalidRole))]
    #[case("owner", Err(UserValidationError::InvalidRole))]
    fn role_parsing(#[case] raw: &str, #[case] expected: Result<Role, UserValidationError>) {
        assert_eq!(raw.parse::<Role>(), expected);
    }

    #[rstest]
    fn registration_defaults_to_regular_o_negative(identity: SignInIdentity) {
        let now = Utc::now();
        let user = User::register(identity, now);
        assert_eq!(user.role, Role::Regular);
        assert_eq!(user.blood_group, BloodGroup::ONegative);
        assert_eq!(user.email.as_ref(), "donor@example.com");
        assert_eq!(user.created_at, now);
    }

    #[rstest]
    fn profile_update_touches_only_supplied_fields(identity: SignInIdentity) {
        let created = Utc::now();
        let mut user = User::register(identity, created);
        let update = ProfileUpdate {
            blood_group: Some(BloodGroup::BPositive),
            phone: Some(PhoneNumber::new("9000000001").expect("phone")),
            ..ProfileUpdate::default()
        };
        let later = created + chrono::Duration::minutes(5);

        update.apply_to(&mut user, later);

        assert_eq!(user.blood_group, BloodGroup::BPositive);
        assert_eq!(user.phone.as_ref().map(AsRef::as_ref), Some("9000000001"));
        assert_eq!(user.name.as_ref(), "Demo Donor");
        assert_eq!(user.updated_at, later);
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }
}
