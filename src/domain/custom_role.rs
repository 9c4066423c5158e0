//! Tenant-owned custom roles

use super::common::{CustomRoleId, TenantId};
use super::permission::Permission;
use super::role::BuiltinRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A role defined by a tenant administrator.
///
/// The effective permission set is `base_role` permissions, plus `add`, minus
/// `remove`. The base is always a built-in role, so custom roles cannot chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRole {
    pub id: CustomRoleId,
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_role: Option<BuiltinRole>,
    #[serde(default)]
    pub add: Vec<Permission>,
    #[serde(default)]
    pub remove: Vec<Permission>,
    /// Incremented on every edit; resolution results are cached per version.
    #[serde(default = "initial_version")]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn initial_version() -> u64 {
    1
}

impl Default for CustomRole {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: CustomRoleId::new_v4(),
            tenant_id: TenantId::nil(),
            name: String::new(),
            description: None,
            base_role: None,
            add: vec![],
            remove: vec![],
            version: initial_version(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a custom role
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomRoleInput {
    pub tenant_id: TenantId,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub base_role: Option<BuiltinRole>,
    #[serde(default)]
    pub add: Vec<Permission>,
    #[serde(default)]
    pub remove: Vec<Permission>,
}

/// Input for updating a custom role
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomRoleInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    // None keeps the current base, Some(None) detaches it
    #[serde(default)]
    pub base_role: Option<Option<BuiltinRole>>,
    pub add: Option<Vec<Permission>>,
    pub remove: Option<Vec<Permission>>,
}
