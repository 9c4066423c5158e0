//! Common test utilities

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use farmgate_core::domain::{
    BarnId, BindingId, BuiltinRole, CustomRole, CustomRoleAssignment, FarmId, PrincipalContext,
    RoleAssignment, Scope, TenantId, UserId, UserRecord,
};
use farmgate_core::repository::{InMemoryCustomRoleRepository, InMemoryOrgDirectory};
use farmgate_core::ContextBuilder;
use std::sync::Arc;

/// Two tenants; T1 owns farms F1 (barn B1) and F2 (barn B2), T2 owns F3.
pub struct World {
    pub t1: TenantId,
    pub t2: TenantId,
    pub f1: FarmId,
    pub f2: FarmId,
    pub f3: FarmId,
    pub b1: BarnId,
    pub b2: BarnId,
}

impl World {
    pub fn new() -> Self {
        Self {
            t1: TenantId::new_v4(),
            t2: TenantId::new_v4(),
            f1: FarmId::new_v4(),
            f2: FarmId::new_v4(),
            f3: FarmId::new_v4(),
            b1: BarnId::new_v4(),
            b2: BarnId::new_v4(),
        }
    }

    pub fn org(&self) -> InMemoryOrgDirectory {
        InMemoryOrgDirectory::new()
            .with_farm(self.t1, self.f1)
            .with_farm(self.t1, self.f2)
            .with_farm(self.t2, self.f3)
            .with_barn(self.f1, self.b1)
            .with_barn(self.f2, self.b2)
    }

    /// A user who belongs to both tenants and holds no roles yet
    pub fn member(&self) -> UserRecord {
        UserRecord {
            tenant_ids: vec![self.t1, self.t2],
            ..UserRecord::new(UserId::new_v4())
        }
    }

    pub fn build(&self, user: &UserRecord, custom_roles: Vec<CustomRole>) -> PrincipalContext {
        ContextBuilder::new(
            Arc::new(self.org()),
            Arc::new(InMemoryCustomRoleRepository::with_roles(custom_roles)),
        )
        .build(user)
        .expect("in-memory context build cannot fail")
    }
}

pub fn granted_at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 8, 0, 0).unwrap()
}

pub fn assign(role: BuiltinRole, scope: Scope) -> RoleAssignment {
    RoleAssignment {
        id: BindingId::new_v4(),
        role,
        scope,
        granted_at: granted_at(1),
        revoked_at: None,
    }
}

pub fn assign_custom(
    role: &CustomRole,
    farm_id: Option<FarmId>,
    barn_id: Option<BarnId>,
) -> CustomRoleAssignment {
    CustomRoleAssignment {
        id: BindingId::new_v4(),
        custom_role_id: role.id,
        farm_id,
        barn_id,
        granted_at: granted_at(1),
        revoked_at: None,
    }
}
