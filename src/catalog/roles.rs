//! Built-in role registry

use crate::domain::{BuiltinRole, Permission, PermissionSet, ScopeClass};
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;

/// Static definition of a built-in role
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: BuiltinRole,
    pub display_name: &'static str,
    /// Narrowest class the role can be bound at
    pub min_scope_class: ScopeClass,
    /// Broadest class the role can be bound at
    pub max_scope_class: ScopeClass,
    pub permissions: PermissionSet,
}

fn definition(
    role: BuiltinRole,
    min_scope_class: ScopeClass,
    max_scope_class: ScopeClass,
    permissions: PermissionSet,
) -> (BuiltinRole, RoleDefinition) {
    (
        role,
        RoleDefinition {
            role,
            display_name: role.display_name(),
            min_scope_class,
            max_scope_class,
            permissions,
        },
    )
}

fn set(permissions: &[Permission]) -> PermissionSet {
    permissions.iter().copied().collect()
}

lazy_static::lazy_static! {
    static ref ROLE_TABLE: HashMap<BuiltinRole, RoleDefinition> = {
        use Permission::*;

        let everything: PermissionSet = Permission::ALL.iter().copied().collect();
        let tenant_wide: PermissionSet = Permission::ALL
            .iter()
            .copied()
            .filter(|p| !p.is_platform_only())
            .collect();
        let mut support: PermissionSet = Permission::ALL
            .iter()
            .copied()
            .filter(Permission::is_read)
            .collect();
        support.extend([SupportTicketWrite, SupportImpersonate]);

        HashMap::from([
            definition(
                BuiltinRole::PlatformAdmin,
                ScopeClass::Global,
                ScopeClass::Global,
                everything,
            ),
            definition(
                BuiltinRole::PlatformSupport,
                ScopeClass::Global,
                ScopeClass::Global,
                support,
            ),
            definition(
                BuiltinRole::TenantAdmin,
                ScopeClass::Tenant,
                ScopeClass::Tenant,
                tenant_wide,
            ),
            definition(
                BuiltinRole::FarmManager,
                ScopeClass::Farm,
                ScopeClass::Tenant,
                set(&[
                    TenantRead, UserRead, UserInvite, RoleAssign,
                    FarmRead, FarmWrite, BarnRead, BarnWrite,
                    DeviceRead, DeviceConfigure, DeviceProvision,
                    TelemetryRead, AlertRead, AlertAcknowledge, AlertRuleManage,
                    ReportRead, ReportExport,
                    HealthRecordRead,
                    SupportTicketRead, SupportTicketWrite,
                ]),
            ),
            definition(
                BuiltinRole::Veterinarian,
                ScopeClass::Farm,
                ScopeClass::Tenant,
                set(&[
                    FarmRead, BarnRead, TelemetryRead, AlertRead, ReportRead,
                    HealthRecordRead, HealthRecordWrite, ComplianceExport,
                ]),
            ),
            definition(
                BuiltinRole::BarnOperator,
                ScopeClass::Barn,
                ScopeClass::Farm,
                set(&[
                    FarmRead, BarnRead, DeviceRead, DeviceConfigure,
                    TelemetryRead, AlertRead, AlertAcknowledge, ReportRead,
                ]),
            ),
            definition(
                BuiltinRole::ReadOnly,
                ScopeClass::Barn,
                ScopeClass::Tenant,
                set(&[
                    TenantRead, FarmRead, BarnRead, DeviceRead,
                    TelemetryRead, AlertRead, ReportRead,
                ]),
            ),
        ])
    };
}

/// Read-only registry of built-in roles, loaded once per process.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleRegistry;

impl RoleRegistry {
    /// Resolve a role id, failing with `UnknownRole`.
    pub fn lookup_role(&self, id: &str) -> Result<BuiltinRole> {
        BuiltinRole::from_id(id)
    }

    pub fn definition(&self, role: BuiltinRole) -> &'static RoleDefinition {
        // Every BuiltinRole variant has a table entry; covered by test_every_role_is_registered.
        &ROLE_TABLE[&role]
    }

    pub fn definitions(&self) -> Vec<&'static RoleDefinition> {
        BuiltinRole::ALL
            .iter()
            .map(|role| self.definition(*role))
            .collect()
    }

    pub fn permissions_of(&self, role: BuiltinRole) -> &'static PermissionSet {
        &self.definition(role).permissions
    }

    pub fn min_scope_class(&self, role: BuiltinRole) -> ScopeClass {
        self.definition(role).min_scope_class
    }

    pub fn max_scope_class(&self, role: BuiltinRole) -> ScopeClass {
        self.definition(role).max_scope_class
    }

    /// Whether a binding of `role` at `class` is within the role's bounds.
    pub fn allows_binding_class(&self, role: BuiltinRole, class: ScopeClass) -> bool {
        let def = self.definition(role);
        def.min_scope_class <= class && class <= def.max_scope_class
    }

    pub fn grants(&self, role: BuiltinRole, permission: Permission) -> bool {
        self.permissions_of(role).contains(&permission)
    }

    /// Built-in roles whose permission set contains `permission`
    pub fn roles_granting(&self, permission: Permission) -> Vec<BuiltinRole> {
        BuiltinRole::ALL
            .iter()
            .copied()
            .filter(|role| self.grants(*role, permission))
            .collect()
    }
}
