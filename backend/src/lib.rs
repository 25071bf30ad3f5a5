//! Blood bank backend library.
//!
//! Hexagonal layout: `domain` holds entities, services and ports; `inbound`
//! adapts HTTP onto the driving ports; `outbound` implements the driven ports
//! over PostgreSQL. The `bloodbank` binary wires them together.

pub mod doc;
pub mod domain;
#[cfg(feature = "example-data")]
pub mod example_data;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
