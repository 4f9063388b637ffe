//! Authorization gate for the caller-facing routes.
//!
//! Only the presence of a credential is checked here; verifying it belongs
//! to the identity layer in front of this service.

pub mod middleware;

pub use middleware::require_authorization;
