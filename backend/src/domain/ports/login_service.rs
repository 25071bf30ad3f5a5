//! Driving port for sign-in.
//!
//! Inbound adapters call it with an identity asserted upstream and receive
//! the matching account, created on first sign-in.

use async_trait::async_trait;

use crate::domain::{Error, SignInIdentity, User};

/// Domain use-case port for sign-in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Find the account for `identity.email` or register a new one.
    async fn sign_in(&self, identity: SignInIdentity) -> Result<User, Error>;
}
