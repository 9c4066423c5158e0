//! Permission catalog

use crate::domain::{Permission, PermissionCategory, PermissionSet};
use crate::error::Result;
use serde::Serialize;

/// Read-only registry of every permission the platform defines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionCatalog;

/// One category with its permissions, for permission-matrix screens
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category: PermissionCategory,
    pub display_name: &'static str,
    pub permissions: Vec<Permission>,
}

impl PermissionCatalog {
    /// Resolve a permission code, failing with `UnknownPermission`.
    pub fn lookup_permission(&self, code: &str) -> Result<Permission> {
        Permission::from_code(code)
    }

    pub fn all(&self) -> PermissionSet {
        Permission::ALL.iter().copied().collect()
    }

    pub fn by_category(&self, category: PermissionCategory) -> Vec<Permission> {
        Permission::ALL
            .iter()
            .copied()
            .filter(|p| p.category() == category)
            .collect()
    }

    pub fn categories(&self) -> Vec<CategoryListing> {
        PermissionCategory::ALL
            .iter()
            .map(|category| CategoryListing {
                category: *category,
                display_name: category.display_name(),
                permissions: self.by_category(*category),
            })
            .collect()
    }
}
