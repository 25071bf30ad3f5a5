//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Email, Role, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Port for reading and writing user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new account.
    ///
    /// Fails with [`UserPersistenceError::DuplicateEmail`] when the email is
    /// taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Overwrite the profile fields of an existing account.
    async fn update_profile(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Change a user's role. Returns `false` when no such user exists.
    async fn set_role(
        &self,
        id: &UserId,
        role: Role,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError>;

    /// Every account, oldest first.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;
}
