//! Request middleware.

pub mod tenant;

pub use tenant::{CurrentTenant, tenant_guard};
