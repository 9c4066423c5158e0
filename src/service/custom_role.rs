//! Custom role resolution and tenant-administrator operations

use crate::cache::ResolutionCache;
use crate::catalog::RoleRegistry;
use crate::domain::{
    BuiltinRole, CreateCustomRoleInput, CustomRole, CustomRoleId, Permission, PermissionSet,
    ScopeClass, TenantId, UpdateCustomRoleInput,
};
use crate::error::{AppError, Result};
use crate::repository::CustomRoleRepository;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

/// Compute the effective permission set of a custom role.
///
/// Base role permissions, union `add`, minus `remove`. Removal is applied last
/// so it wins over both the base and `add`. Platform-only permissions are
/// never part of the result.
pub fn resolve_permissions(role: &CustomRole) -> PermissionSet {
    let mut permissions = role
        .base_role
        .map(|base| RoleRegistry.permissions_of(base).clone())
        .unwrap_or_default();
    permissions.extend(role.add.iter().copied());
    for permission in &role.remove {
        permissions.remove(permission);
    }
    permissions.retain(|p| !p.is_platform_only());
    permissions
}

/// Cached front for [`resolve_permissions`]
pub struct CustomRoleResolver {
    cache: Arc<ResolutionCache>,
}

impl CustomRoleResolver {
    pub fn new(cache: Arc<ResolutionCache>) -> Self {
        Self { cache }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Arc::new(ResolutionCache::new(capacity)))
    }

    pub fn resolve(&self, role: &CustomRole) -> Arc<PermissionSet> {
        if let Some(hit) = self.cache.get(role.id, role.version) {
            return hit;
        }
        let permissions = Arc::new(resolve_permissions(role));
        self.cache
            .put(role.id, role.version, Arc::clone(&permissions));
        permissions
    }

    /// Must be called after a custom role changes and before the next decision that uses it.
    pub fn invalidate(&self, id: CustomRoleId) {
        self.cache.invalidate(id);
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }
}

impl Default for CustomRoleResolver {
    fn default() -> Self {
        Self::new(Arc::new(ResolutionCache::default()))
    }
}

pub struct CustomRoleService<R: CustomRoleRepository> {
    repo: Arc<R>,
    resolver: Arc<CustomRoleResolver>,
}

impl<R: CustomRoleRepository> CustomRoleService<R> {
    pub fn new(repo: Arc<R>, resolver: Arc<CustomRoleResolver>) -> Self {
        Self { repo, resolver }
    }

    pub fn create(&self, input: CreateCustomRoleInput) -> Result<CustomRole> {
        input.validate()?;
        validate_definition(input.base_role, &input.add)?;

        let now = Utc::now();
        let role = CustomRole {
            id: CustomRoleId::new_v4(),
            tenant_id: input.tenant_id,
            name: input.name,
            description: input.description,
            base_role: input.base_role,
            add: input.add,
            remove: input.remove,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&role)?;

        tracing::info!(
            tenant_id = %role.tenant_id,
            custom_role_id = %role.id,
            "Created custom role '{}'",
            role.name
        );
        Ok(role)
    }

    pub fn get(&self, id: CustomRoleId) -> Result<CustomRole> {
        self.repo
            .find(id)?
            .ok_or_else(|| AppError::NotFound(format!("Custom role {} not found", id)))
    }

    pub fn list(&self, tenant_id: TenantId) -> Result<Vec<CustomRole>> {
        self.repo.list_by_tenant(tenant_id)
    }

    pub fn update(&self, id: CustomRoleId, input: UpdateCustomRoleInput) -> Result<CustomRole> {
        input.validate()?;
        let mut role = self.get(id)?;

        if let Some(name) = input.name {
            role.name = name;
        }
        if let Some(description) = input.description {
            role.description = Some(description);
        }
        if let Some(base_role) = input.base_role {
            role.base_role = base_role;
        }
        if let Some(add) = input.add {
            role.add = add;
        }
        if let Some(remove) = input.remove {
            role.remove = remove;
        }
        validate_definition(role.base_role, &role.add)?;

        role.version += 1;
        role.updated_at = Utc::now();
        self.repo.update(&role)?;
        self.resolver.invalidate(id);

        tracing::info!(
            tenant_id = %role.tenant_id,
            custom_role_id = %id,
            version = role.version,
            "Updated custom role"
        );
        Ok(role)
    }

    /// Delete a custom role. Assignments that still reference it are dropped
    /// with a warning the next time a context is built.
    pub fn delete(&self, id: CustomRoleId) -> Result<()> {
        let role = self.get(id)?;
        self.repo.delete(id)?;
        self.resolver.invalidate(id);

        tracing::info!(
            tenant_id = %role.tenant_id,
            custom_role_id = %id,
            "Deleted custom role"
        );
        Ok(())
    }

    /// Effective permission set of a stored custom role
    pub fn permissions(&self, id: CustomRoleId) -> Result<Arc<PermissionSet>> {
        let role = self.get(id)?;
        Ok(self.resolver.resolve(&role))
    }
}

fn validate_definition(base_role: Option<BuiltinRole>, add: &[Permission]) -> Result<()> {
    if let Some(base) = base_role {
        if RoleRegistry.min_scope_class(base) > ScopeClass::Tenant {
            return Err(AppError::Validation(format!(
                "Built-in role '{}' cannot be used as a custom role base",
                base
            )));
        }
    }
    if let Some(p) = add.iter().find(|p| p.is_platform_only()) {
        return Err(AppError::Validation(format!(
            "Permission {} cannot be granted by a custom role",
            p
        )));
    }
    Ok(())
}
