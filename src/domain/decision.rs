//! Decision values produced by the policy engine

use super::binding::{PrincipalContext, RoleBinding};
use super::common::{TenantId, UserId};
use super::permission::Permission;
use super::role::RoleRef;
use super::scope::Scope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a permission check was denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DenialReason {
    /// No role held by the principal grants the permission anywhere
    NoMatchingRole,
    /// The permission is granted, but only at scopes that do not contain the target
    ScopeMismatch { granted_scopes: Vec<Scope> },
    /// The only role granting the permission has no active binding
    RoleWithoutBinding { role: RoleRef },
}

impl DenialReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::NoMatchingRole => "no_matching_role",
            DenialReason::ScopeMismatch { .. } => "scope_mismatch",
            DenialReason::RoleWithoutBinding { .. } => "role_without_binding",
        }
    }

    /// User-facing explanation, suitable for a tooltip or a forbidden page
    pub fn message(&self) -> String {
        match self {
            DenialReason::NoMatchingRole => {
                "None of your roles allow this action".to_string()
            }
            DenialReason::ScopeMismatch { granted_scopes } => match granted_scopes.as_slice() {
                [single] => format!(
                    "You can only perform this action within {}",
                    describe_scope(single)
                ),
                _ => format!(
                    "You can only perform this action within {} other locations",
                    granted_scopes.len()
                ),
            },
            DenialReason::RoleWithoutBinding { role } => format!(
                "Your {} role that allows this action is no longer active",
                role
            ),
        }
    }
}

fn describe_scope(scope: &Scope) -> String {
    match scope {
        Scope::Global => "the platform".to_string(),
        Scope::Tenant { tenant_id } => format!("tenant {}", tenant_id),
        Scope::Farm { farm_id, .. } => format!("farm {}", farm_id),
        Scope::Barn { barn_id, .. } => format!("barn {}", barn_id),
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of one permission check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub matched_binding: Option<RoleBinding>,
    pub reason: Option<DenialReason>,
}

impl Decision {
    pub fn allow(binding: RoleBinding) -> Self {
        Self {
            allowed: true,
            matched_binding: Some(binding),
            reason: None,
        }
    }

    pub fn deny(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            matched_binding: None,
            reason: Some(reason),
        }
    }

    pub fn reason_code(&self) -> Option<&'static str> {
        self.reason.as_ref().map(DenialReason::code)
    }

    /// Compact transport shape
    pub fn view(&self) -> DecisionView {
        DecisionView {
            allowed: self.allowed,
            reason_code: self.reason_code(),
            matched_role: self.matched_binding.as_ref().map(|b| b.role),
            matched_scope: self.matched_binding.as_ref().map(|b| b.scope),
        }
    }

    /// Audit record for the caller to persist; the engine never writes it itself.
    pub fn audit_event(
        &self,
        context: &PrincipalContext,
        permission: Permission,
        target: &Scope,
        occurred_at: DateTime<Utc>,
    ) -> AuditEvent {
        AuditEvent {
            user_id: context.user_id(),
            tenant_id: target.tenant_id(),
            permission,
            target: *target,
            allowed: self.allowed,
            reason: self.reason.clone(),
            matched_binding_id: self.matched_binding.as_ref().map(|b| b.id.to_string()),
            matched_role: self.matched_binding.as_ref().map(|b| b.role),
            occurred_at,
        }
    }
}

/// Serialized decision: `{allowed, reasonCode, matchedRole?, matchedScope?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionView {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_role: Option<RoleRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_scope: Option<Scope>,
}

/// Audit log entry describing one decision
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub user_id: UserId,
    pub tenant_id: Option<TenantId>,
    pub permission: Permission,
    pub target: Scope,
    pub allowed: bool,
    pub reason: Option<DenialReason>,
    pub matched_binding_id: Option<String>,
    pub matched_role: Option<RoleRef>,
    pub occurred_at: DateTime<Utc>,
}
