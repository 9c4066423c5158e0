//! Farmgate Core - Authorization Decision Engine
//!
//! This crate decides whether a user of the Farmgate console may use a given
//! permission at a given scope (platform, tenant, farm or barn), based on the
//! built-in and tenant-defined custom roles bound to that user.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod policy;
pub mod repository;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use policy::{has_any_role, DecisionEngine};
pub use service::{ContextBuilder, CustomRoleResolver, CustomRoleService};
