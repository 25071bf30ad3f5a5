//! Test utilities for the backend crate.
//!
//! [`InMemoryStore`] implements every repository port over a single mutex so
//! HTTP integration tests (in `tests/`) can drive the real domain services
//! without a database. Grant transitions are applied under one lock, which
//! gives them the same all-or-nothing behaviour as the Diesel adapter.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use uuid::Uuid;

use crate::domain::ports::{
    GrantRepository, GrantRepositoryError, InventoryRepository, InventoryRepositoryError,
    LedgerRepository, LedgerRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    BloodGroup, Direction, DonationService, Email, GrantRequestService, GrantStatus,
    InventoryService, InventoryTallies, LedgerEffect, LedgerEntry, LedgerTally, RequestGrant,
    RequestTally, Role, TransitionPlan, User, UserAccountService, UserId,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    ledger: Vec<LedgerEntry>,
    grants: Vec<RequestGrant>,
}

/// Mutex-guarded users, ledger and grants.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, &'static str> {
        self.tables.lock().map_err(|_| POISONED)
    }

    /// Every ledger entry, in insertion order.
    #[must_use]
    pub fn ledger_entries(&self) -> Vec<LedgerEntry> {
        self.lock()
            .map(|tables| tables.ledger.clone())
            .unwrap_or_default()
    }

    /// `OUT` entries materialized by `grant_id`.
    #[must_use]
    pub fn out_entries_for(&self, grant_id: Uuid) -> Vec<LedgerEntry> {
        self.ledger_entries()
            .into_iter()
            .filter(|entry| {
                entry.direction == Direction::Out && entry.request_grant_id == Some(grant_id)
            })
            .collect()
    }

    /// Look up a stored grant.
    #[must_use]
    pub fn grant(&self, grant_id: Uuid) -> Option<RequestGrant> {
        self.lock()
            .ok()
            .and_then(|tables| tables.grants.iter().find(|g| g.id == grant_id).cloned())
    }

    /// Insert or replace a user, e.g. to pre-provision an admin account.
    pub fn put_user(&self, user: User) {
        if let Ok(mut tables) = self.lock() {
            tables.users.retain(|existing| existing.id != user.id);
            tables.users.push(user);
        }
    }

    /// Build HTTP state wiring the real services over this store.
    #[must_use]
    pub fn http_state(self: &Arc<Self>) -> HttpState {
        self.http_state_with_clock(Arc::new(DefaultClock))
    }

    /// Build HTTP state with an explicit clock.
    #[must_use]
    pub fn http_state_with_clock(self: &Arc<Self>, clock: Arc<dyn Clock>) -> HttpState {
        let accounts = Arc::new(UserAccountService::new(self.clone(), clock.clone()));
        let donations = Arc::new(DonationService::new(self.clone(), clock.clone()));
        let grants = Arc::new(GrantRequestService::new(self.clone(), clock));
        let inventory = Arc::new(InventoryService::new(self.clone()));

        HttpState::new(HttpStatePorts {
            login: accounts.clone(),
            principals: accounts.clone(),
            profile: accounts.clone(),
            profile_command: accounts.clone(),
            user_admin: accounts,
            donations: donations.clone(),
            donations_query: donations,
            grant_requests: grants.clone(),
            grant_requests_query: grants.clone(),
            grant_transitions: grants,
            inventory,
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables.users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables.users.iter().find(|u| &u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        if let Some(stored) = tables.users.iter_mut().find(|u| u.id == user.id) {
            let role = stored.role;
            *stored = User {
                role,
                ..user.clone()
            };
        }
        Ok(())
    }

    async fn set_role(
        &self,
        id: &UserId,
        role: Role,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(match tables.users.iter_mut().find(|u| &u.id == id) {
            Some(user) => {
                user.role = role;
                user.updated_at = updated_at;
                true
            }
            None => false,
        })
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::query)?;
        let mut users = tables.users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[async_trait]
impl LedgerRepository for InMemoryStore {
    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerRepositoryError> {
        let mut tables = self.lock().map_err(LedgerRepositoryError::query)?;
        tables.ledger.push(entry.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        direction: Direction,
    ) -> Result<Vec<LedgerEntry>, LedgerRepositoryError> {
        let tables = self.lock().map_err(LedgerRepositoryError::query)?;
        Ok(tables
            .ledger
            .iter()
            .filter(|e| &e.user_id == user_id && e.direction == direction)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GrantRepository for InMemoryStore {
    async fn create(&self, grant: &RequestGrant) -> Result<(), GrantRepositoryError> {
        let mut tables = self.lock().map_err(GrantRepositoryError::query)?;
        tables.grants.push(grant.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<RequestGrant>, GrantRepositoryError> {
        let tables = self.lock().map_err(GrantRepositoryError::query)?;
        Ok(tables.grants.iter().find(|g| &g.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<RequestGrant>, GrantRepositoryError> {
        let tables = self.lock().map_err(GrantRepositoryError::query)?;
        let mut grants = tables.grants.clone();
        grants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(grants)
    }

    async fn commit_transition(&self, plan: &TransitionPlan) -> Result<(), GrantRepositoryError> {
        let mut guard = self.lock().map_err(GrantRepositoryError::query)?;
        let tables = &mut *guard;
        let Some(grant) = tables.grants.iter_mut().find(|g| g.id == plan.grant_id) else {
            return Err(GrantRepositoryError::query(format!(
                "grant {} vanished",
                plan.grant_id
            )));
        };
        if grant.revision != plan.expected_revision {
            return Err(GrantRepositoryError::revision_mismatch(
                plan.grant_id,
                plan.expected_revision,
            ));
        }

        match &plan.effect {
            LedgerEffect::Unchanged => {}
            LedgerEffect::Materialize(entry) => {
                if tables
                    .ledger
                    .iter()
                    .any(|e| e.request_grant_id == Some(plan.grant_id))
                {
                    return Err(GrantRepositoryError::query(
                        "grant already has a ledger entry",
                    ));
                }
                tables.ledger.push(entry.clone());
            }
            LedgerEffect::Retract { entry_id } => {
                tables.ledger.retain(|e| &e.id != entry_id);
            }
        }
        grant.apply_plan(plan);
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for InMemoryStore {
    async fn tallies(&self) -> Result<InventoryTallies, InventoryRepositoryError> {
        let tables = self.lock().map_err(InventoryRepositoryError::query)?;
        Ok(InventoryTallies {
            ledger: ledger_tallies(&tables),
            requests: request_tallies(&tables),
        })
    }
}

fn ledger_tallies(tables: &Tables) -> Vec<LedgerTally> {
    let mut grouped: BTreeMap<(BloodGroup, Direction, UserId), (i64, i64)> = BTreeMap::new();
    for entry in &tables.ledger {
        let slot = grouped
            .entry((entry.blood_group, entry.direction, entry.user_id))
            .or_default();
        slot.0 += i64::from(entry.quantity.get());
        slot.1 += 1;
    }
    grouped
        .into_iter()
        .map(
            |((blood_group, direction, user_id), (quantity, transactions))| LedgerTally {
                blood_group,
                direction,
                user_id,
                quantity,
                transactions,
            },
        )
        .collect()
}

fn request_tallies(tables: &Tables) -> Vec<RequestTally> {
    let mut grouped: BTreeMap<(BloodGroup, &'static str), (GrantStatus, i64, i64)> =
        BTreeMap::new();
    for grant in &tables.grants {
        let slot = grouped
            .entry((grant.blood_group, grant.status.as_str()))
            .or_insert((grant.status, 0, 0));
        slot.1 += 1;
        slot.2 += i64::from(grant.quantity.get());
    }
    grouped
        .into_iter()
        .map(|((blood_group, _), (status, requests, quantity))| RequestTally {
            blood_group,
            status,
            requests,
            quantity,
        })
        .collect()
}
