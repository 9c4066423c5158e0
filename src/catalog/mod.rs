//! Static permission catalog and built-in role registry.
//!
//! Both are immutable after first use and safe to share across threads.

pub mod permissions;
pub mod roles;

pub use permissions::{CategoryListing, PermissionCatalog};
pub use roles::{RoleDefinition, RoleRegistry};
