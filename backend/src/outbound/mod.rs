//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain types and storage
//! representations; status rules and validation stay in the domain.

pub mod persistence;
