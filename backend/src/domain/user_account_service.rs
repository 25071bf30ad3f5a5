//! User account service.
//!
//! Implements sign-in, caller resolution, profile and user administration
//! driving ports over a single [`UserRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    LoginService, PrincipalResolver, UserAdministration, UserPersistenceError, UserProfileCommand,
    UserProfileQuery, UserRepository,
};
use crate::domain::{Error, Principal, ProfileUpdate, Role, SignInIdentity, User, UserId};

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
    }
}

/// Account service implementing the user-facing driving ports.
#[derive(Clone)]
pub struct UserAccountService<R> {
    users: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UserAccountService<R> {
    /// Create the service over a user repository.
    pub fn new(users: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

impl<R> UserAccountService<R>
where
    R: UserRepository,
{
    async fn require_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[async_trait]
impl<R> LoginService for UserAccountService<R>
where
    R: UserRepository,
{
    async fn sign_in(&self, identity: SignInIdentity) -> Result<User, Error> {
        if let Some(user) = self
            .users
            .find_by_email(&identity.email)
            .await
            .map_err(map_repository_error)?
        {
            return Ok(user);
        }

        let email = identity.email.clone();
        let user = User::register(identity, self.clock.utc());
        match self.users.insert(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "registered user on first sign-in");
                Ok(user)
            }
            // A concurrent first sign-in won the insert; use its row.
            Err(UserPersistenceError::DuplicateEmail { .. }) => self
                .users
                .find_by_email(&email)
                .await
                .map_err(map_repository_error)?
                .ok_or_else(|| Error::conflict(format!("email {email} is already registered"))),
            Err(other) => Err(map_repository_error(other)),
        }
    }
}

#[async_trait]
impl<R> PrincipalResolver for UserAccountService<R>
where
    R: UserRepository,
{
    async fn resolve(&self, user_id: &UserId) -> Result<Option<Principal>, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?;
        Ok(user.map(|user| Principal::new(user.id, user.role)))
    }
}

#[async_trait]
impl<R> UserProfileQuery for UserAccountService<R>
where
    R: UserRepository,
{
    async fn profile(&self, principal: &Principal) -> Result<User, Error> {
        self.require_user(principal.user_id()).await
    }
}

#[async_trait]
impl<R> UserProfileCommand for UserAccountService<R>
where
    R: UserRepository,
{
    async fn update_profile(
        &self,
        principal: &Principal,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = self.require_user(principal.user_id()).await?;
        if update.is_empty() {
            return Ok(user);
        }

        update.apply_to(&mut user, self.clock.utc());
        self.users
            .update_profile(&user)
            .await
            .map_err(map_repository_error)?;
        Ok(user)
    }
}

#[async_trait]
impl<R> UserAdministration for UserAccountService<R>
where
    R: UserRepository,
{
    async fn list_users(&self, principal: &Principal) -> Result<Vec<User>, Error> {
        principal.require_admin()?;
        self.users.list().await.map_err(map_repository_error)
    }

    async fn assign_role(
        &self,
        principal: &Principal,
        user_id: UserId,
        role: Role,
    ) -> Result<(), Error> {
        principal.require_admin()?;
        let updated = self
            .users
            .set_role(&user_id, role, self.clock.utc())
            .await
            .map_err(map_repository_error)?;
        if !updated {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }

        info!(
            acting_user = %principal.user_id(),
            %user_id,
            role = role.as_str(),
            "user role changed"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
