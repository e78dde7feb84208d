//! Library backend: users borrow and return books, with loan counts and
//! per-type book statistics.
//!
//! The crate follows a hexagonal layout. [`domain`] holds entities, services
//! and ports; [`inbound`] adapts HTTP requests onto the driving ports;
//! [`outbound`] implements the driven ports on PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
