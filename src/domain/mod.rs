//! Domain models for Farmgate Core

pub mod binding;
pub mod common;
pub mod custom_role;
pub mod decision;
pub mod permission;
pub mod role;
pub mod scope;

pub use binding::*;
pub use common::*;
pub use custom_role::*;
pub use decision::*;
pub use permission::*;
pub use role::*;
pub use scope::*;
