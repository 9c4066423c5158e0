//! Role identifiers

use super::common::CustomRoleId;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in role shipped with the platform.
///
/// Permission sets and scope bounds live in [`crate::catalog::RoleRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinRole {
    PlatformAdmin,
    PlatformSupport,
    TenantAdmin,
    FarmManager,
    Veterinarian,
    BarnOperator,
    ReadOnly,
}

impl BuiltinRole {
    pub const ALL: [BuiltinRole; 7] = [
        BuiltinRole::PlatformAdmin,
        BuiltinRole::PlatformSupport,
        BuiltinRole::TenantAdmin,
        BuiltinRole::FarmManager,
        BuiltinRole::Veterinarian,
        BuiltinRole::BarnOperator,
        BuiltinRole::ReadOnly,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BuiltinRole::PlatformAdmin => "platform_admin",
            BuiltinRole::PlatformSupport => "platform_support",
            BuiltinRole::TenantAdmin => "tenant_admin",
            BuiltinRole::FarmManager => "farm_manager",
            BuiltinRole::Veterinarian => "veterinarian",
            BuiltinRole::BarnOperator => "barn_operator",
            BuiltinRole::ReadOnly => "read_only",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BuiltinRole::PlatformAdmin => "Platform administrator",
            BuiltinRole::PlatformSupport => "Platform support",
            BuiltinRole::TenantAdmin => "Tenant administrator",
            BuiltinRole::FarmManager => "Farm manager",
            BuiltinRole::Veterinarian => "Veterinarian",
            BuiltinRole::BarnOperator => "Barn operator",
            BuiltinRole::ReadOnly => "Read only",
        }
    }

    /// Look up a built-in role by its id.
    pub fn from_id(id: &str) -> Result<Self> {
        BuiltinRole::ALL
            .iter()
            .copied()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::UnknownRole(id.to_string()))
    }
}

impl fmt::Display for BuiltinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BuiltinRole {
    type Err = AppError;
    fn from_str(s: &str) -> Result<Self> {
        BuiltinRole::from_id(s)
    }
}

/// Reference to either a built-in role or a tenant's custom role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RoleRef {
    Builtin(BuiltinRole),
    Custom(CustomRoleId),
}

impl RoleRef {
    pub fn is_builtin(&self) -> bool {
        matches!(self, RoleRef::Builtin(_))
    }
}

impl From<BuiltinRole> for RoleRef {
    fn from(role: BuiltinRole) -> Self {
        RoleRef::Builtin(role)
    }
}

impl From<CustomRoleId> for RoleRef {
    fn from(id: CustomRoleId) -> Self {
        RoleRef::Custom(id)
    }
}

impl fmt::Display for RoleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleRef::Builtin(role) => write!(f, "builtin:{}", role),
            RoleRef::Custom(id) => write!(f, "custom:{}", id),
        }
    }
}
