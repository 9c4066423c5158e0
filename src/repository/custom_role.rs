//! Custom role repository

use crate::domain::{CustomRole, CustomRoleId, TenantId};
use crate::error::{AppError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Caller-supplied store of custom role definitions.
///
/// Freshness is the implementor's concern; the engine reads through it once
/// per context build and treats the result as a point-in-time snapshot.
#[cfg_attr(test, mockall::automock)]
pub trait CustomRoleRepository: Send + Sync {
    fn find(&self, id: CustomRoleId) -> Result<Option<CustomRole>>;
    fn list_by_tenant(&self, tenant_id: TenantId) -> Result<Vec<CustomRole>>;
    fn insert(&self, role: &CustomRole) -> Result<()>;
    fn update(&self, role: &CustomRole) -> Result<()>;
    fn delete(&self, id: CustomRoleId) -> Result<()>;
}

/// In-process store, used by the CLI and in tests
#[derive(Default)]
pub struct InMemoryCustomRoleRepository {
    roles: RwLock<HashMap<CustomRoleId, CustomRole>>,
}

impl InMemoryCustomRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(roles: impl IntoIterator<Item = CustomRole>) -> Self {
        Self {
            roles: RwLock::new(roles.into_iter().map(|r| (r.id, r)).collect()),
        }
    }
}

impl CustomRoleRepository for InMemoryCustomRoleRepository {
    fn find(&self, id: CustomRoleId) -> Result<Option<CustomRole>> {
        Ok(self.roles.read().get(&id).cloned())
    }

    fn list_by_tenant(&self, tenant_id: TenantId) -> Result<Vec<CustomRole>> {
        let mut roles: Vec<CustomRole> = self
            .roles
            .read()
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(roles)
    }

    fn insert(&self, role: &CustomRole) -> Result<()> {
        let mut roles = self.roles.write();
        if roles.contains_key(&role.id) {
            return Err(AppError::Conflict(format!(
                "Custom role {} already exists",
                role.id
            )));
        }
        roles.insert(role.id, role.clone());
        Ok(())
    }

    fn update(&self, role: &CustomRole) -> Result<()> {
        let mut roles = self.roles.write();
        match roles.get_mut(&role.id) {
            Some(existing) => {
                *existing = role.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Custom role {} not found",
                role.id
            ))),
        }
    }

    fn delete(&self, id: CustomRoleId) -> Result<()> {
        self.roles
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Custom role {} not found", id)))
    }
}
