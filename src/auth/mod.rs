pub mod jwt;
pub mod tenant;

pub use tenant::{resolve_tenant, TenantContext};
