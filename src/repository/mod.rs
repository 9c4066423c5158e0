//! Data access seams supplied by the caller

pub mod custom_role;
pub mod org;
pub mod snapshot;

pub use custom_role::{CustomRoleRepository, InMemoryCustomRoleRepository};
pub use org::{InMemoryOrgDirectory, OrgDirectory};
pub use snapshot::Snapshot;
