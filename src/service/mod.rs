//! Business logic layer

pub mod context;
pub mod custom_role;

pub use context::ContextBuilder;
pub use custom_role::{resolve_permissions, CustomRoleResolver, CustomRoleService};
