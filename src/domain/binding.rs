//! Role bindings and the per-request principal context

use super::common::{BarnId, BindingId, CustomRoleId, FarmId, TenantId, UserId};
use super::custom_role::CustomRole;
use super::role::{BuiltinRole, RoleRef};
use super::scope::{Scope, ScopeClass};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Built-in role assignment as stored on the user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: BindingId,
    pub role: BuiltinRole,
    pub scope: Scope,
    pub granted_at: DateTime<Utc>,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Custom role assignment as stored on the user record.
///
/// The scope is the custom role's owning tenant, optionally narrowed to one
/// farm or barn of that tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRoleAssignment {
    pub id: BindingId,
    pub custom_role_id: CustomRoleId,
    #[serde(default)]
    pub farm_id: Option<FarmId>,
    #[serde(default)]
    pub barn_id: Option<BarnId>,
    pub granted_at: DateTime<Utc>,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Authenticated user data handed over by the auth layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub tenant_ids: Vec<TenantId>,
    #[serde(default)]
    pub role_assignments: Vec<RoleAssignment>,
    #[serde(default)]
    pub custom_role_assignments: Vec<CustomRoleAssignment>,
}

impl UserRecord {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            tenant_ids: vec![],
            role_assignments: vec![],
            custom_role_assignments: vec![],
        }
    }
}

/// One principal holding one role at one concrete scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub id: BindingId,
    pub role: RoleRef,
    pub scope: Scope,
    pub granted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactiveReason {
    Revoked,
    Malformed,
}

/// A role the user nominally holds but that has no active binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InactiveRole {
    pub binding_id: BindingId,
    pub role: RoleRef,
    pub reason: InactiveReason,
}

/// Why a binding failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingProblem {
    #[error("role cannot be bound at {class} scope (allowed {min}..={max})")]
    ScopeClassNotAllowed {
        class: ScopeClass,
        min: ScopeClass,
        max: ScopeClass,
    },
    #[error("farm {farm_id} is not known")]
    UnknownFarm { farm_id: FarmId },
    #[error("barn {barn_id} is not known")]
    UnknownBarn { barn_id: BarnId },
    #[error("farm {farm_id} does not belong to tenant {tenant_id}")]
    FarmNotInTenant { farm_id: FarmId, tenant_id: TenantId },
    #[error("barn {barn_id} does not belong to farm {farm_id}")]
    BarnNotInFarm { barn_id: BarnId, farm_id: FarmId },
    #[error("barn {barn_id} given without a farm")]
    BarnWithoutFarm { barn_id: BarnId },
    #[error("user is not a member of tenant {tenant_id}")]
    TenantNotMember { tenant_id: TenantId },
}

impl BindingProblem {
    pub fn kind(&self) -> &'static str {
        match self {
            BindingProblem::ScopeClassNotAllowed { .. } => "scope_class_not_allowed",
            BindingProblem::UnknownFarm { .. } => "unknown_farm",
            BindingProblem::UnknownBarn { .. } => "unknown_barn",
            BindingProblem::FarmNotInTenant { .. } => "farm_not_in_tenant",
            BindingProblem::BarnNotInFarm { .. } => "barn_not_in_farm",
            BindingProblem::BarnWithoutFarm { .. } => "barn_without_farm",
            BindingProblem::TenantNotMember { .. } => "tenant_not_member",
        }
    }
}

/// Non-fatal issue found while building a principal context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum BuildWarning {
    MalformedBinding {
        binding_id: BindingId,
        role: RoleRef,
        problem: BindingProblem,
    },
    UnknownCustomRole {
        binding_id: BindingId,
        custom_role_id: CustomRoleId,
    },
}

/// Everything the decision engine knows about one authenticated user.
///
/// Built wholesale by [`crate::service::ContextBuilder`] and never mutated
/// afterwards; a changed user record means a new context.
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    pub(crate) user_id: UserId,
    pub(crate) tenant_ids: Vec<TenantId>,
    pub(crate) bindings: Vec<RoleBinding>,
    pub(crate) custom_roles: HashMap<CustomRoleId, CustomRole>,
    pub(crate) inactive: Vec<InactiveRole>,
    pub(crate) warnings: Vec<BuildWarning>,
}

impl PrincipalContext {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn tenant_ids(&self) -> &[TenantId] {
        &self.tenant_ids
    }

    /// Active bindings in assignment order
    pub fn bindings(&self) -> &[RoleBinding] {
        &self.bindings
    }

    /// Point-in-time snapshot of the custom roles referenced by the bindings
    pub fn custom_role(&self, id: CustomRoleId) -> Option<&CustomRole> {
        self.custom_roles.get(&id)
    }

    pub fn inactive_roles(&self) -> &[InactiveRole] {
        &self.inactive
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }
}
