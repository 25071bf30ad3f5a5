//! Deterministic demo data for the blood bank backend.
//!
//! This crate turns a named seed from a JSON registry into a reproducible set
//! of donors, donations and blood requests. It is independent of backend
//! domain types to avoid circular dependencies; the backend converts the
//! generated records at the point of use.
//!
//! # Overview
//!
//! - Loading seed registries from JSON files
//! - Deterministic generation using named seeds
//! - Validation rules mirroring backend constraints
//!
//! # Example
//!
//! ```
//! use example_data::{SeedRegistry, generate_example_data};
//!
//! let json = r#"{
//!     "version": 1,
//!     "seeds": [
//!         {"name": "test-seed", "seed": 42, "userCount": 3, "donationCount": 5, "requestCount": 2}
//!     ]
//! }"#;
//!
//! let registry = SeedRegistry::from_json(json).expect("valid registry");
//! let seed_def = registry.find_seed("test-seed").expect("seed exists");
//! let dataset = generate_example_data(seed_def).expect("generation succeeds");
//!
//! assert_eq!(dataset.users.len(), 3);
//! assert_eq!(dataset.donations.len(), 5);
//! assert_eq!(dataset.requests.len(), 2);
//! ```

mod error;
mod generator;
mod registry;
mod seed;
mod validation;

pub use error::{GenerationError, RegistryError};
pub use generator::generate_example_data;
pub use registry::{SeedDefinition, SeedRegistry};
pub use seed::{
    ExampleDataset, ExampleDonationSeed, ExampleRequestSeed, ExampleUserSeed, RequestStatusSeed,
};
pub use validation::{
    BLOOD_GROUPS, NAME_MAX, PHONE_MIN_DIGITS, QUANTITY_MAX, QUANTITY_MIN, is_valid_person_name,
    is_valid_phone,
};
