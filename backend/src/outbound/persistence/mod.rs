//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel, with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Status rules live in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Injected pool**: every repository receives a cloned [`DbPool`].
//! - **Strongly typed errors**: Diesel and pool failures map onto each port's
//!   error enum; checkout failures become connection errors.
//!
//! # Example
//!
//! ```no_run
//! use bloodbank::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bloodbank")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_example_data_seed_repository;
mod diesel_grant_repository;
mod diesel_inventory_repository;
mod diesel_ledger_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_example_data_seed_repository::DieselExampleDataSeedRepository;
pub use diesel_grant_repository::DieselGrantRepository;
pub use diesel_inventory_repository::DieselInventoryRepository;
pub use diesel_ledger_repository::DieselLedgerRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
