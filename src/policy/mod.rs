//! Authorization decision engine.
//!
//! Every check goes through [`DecisionEngine::decide`]: route guards, UI
//! action gates and API middleware all ask the same question (may this
//! principal use this permission at this scope) and get the same answer.

use crate::catalog::{PermissionCatalog, RoleRegistry};
use crate::domain::{
    Decision, DenialReason, Permission, PermissionSet, PrincipalContext, RoleBinding, RoleRef,
    Scope,
};
use crate::error::{AppError, Result};
use crate::service::CustomRoleResolver;
use std::sync::Arc;

pub struct DecisionEngine {
    resolver: Arc<CustomRoleResolver>,
}

impl DecisionEngine {
    pub fn new(resolver: Arc<CustomRoleResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<CustomRoleResolver> {
        &self.resolver
    }

    /// Decide whether `context` may use `permission` at `target`.
    ///
    /// A binding matches when its role grants the permission and its scope is
    /// the target or one of the target's ancestors. Any match allows; the
    /// reported binding is the narrowest one, then built-in before custom,
    /// then the earliest granted.
    pub fn decide(
        &self,
        context: &PrincipalContext,
        permission: Permission,
        target: &Scope,
    ) -> Decision {
        let decision = self.evaluate(context, permission, target);

        let outcome = if decision.allowed { "allow" } else { "deny" };
        let reason = decision.reason_code().unwrap_or("none");
        tracing::debug!(
            user_id = %context.user_id(),
            permission = %permission,
            scope = %target,
            outcome,
            reason,
            "Authorization decision"
        );
        metrics::counter!("farmgate_decisions_total", "outcome" => outcome, "reason" => reason)
            .increment(1);

        decision
    }

    /// Same as [`decide`](Self::decide), taking the permission by its wire code.
    pub fn decide_code(
        &self,
        context: &PrincipalContext,
        code: &str,
        target: &Scope,
    ) -> Result<Decision> {
        let permission = PermissionCatalog.lookup_permission(code)?;
        Ok(self.decide(context, permission, target))
    }

    /// Decide and turn a denial into [`AppError::Forbidden`].
    pub fn enforce(
        &self,
        context: &PrincipalContext,
        permission: Permission,
        target: &Scope,
    ) -> Result<Decision> {
        let decision = self.decide(context, permission, target);
        if decision.allowed {
            return Ok(decision);
        }
        Err(AppError::Forbidden(
            decision.reason.unwrap_or(DenialReason::NoMatchingRole),
        ))
    }

    pub fn has_any_permission(
        &self,
        context: &PrincipalContext,
        permissions: &[Permission],
        target: &Scope,
    ) -> bool {
        permissions
            .iter()
            .any(|p| self.evaluate(context, *p, target).allowed)
    }

    /// True when every listed permission is allowed. An empty list is vacuously allowed.
    pub fn has_all_permissions(
        &self,
        context: &PrincipalContext,
        permissions: &[Permission],
        target: &Scope,
    ) -> bool {
        permissions
            .iter()
            .all(|p| self.evaluate(context, *p, target).allowed)
    }

    /// Every permission `context` is allowed to use at `target`.
    pub fn effective_permissions(
        &self,
        context: &PrincipalContext,
        target: &Scope,
    ) -> PermissionSet {
        let mut permissions = PermissionSet::new();
        for binding in context.bindings() {
            if binding.scope.contains(target) {
                self.extend_with_role(context, &binding.role, &mut permissions);
            }
        }
        permissions
    }

    fn evaluate(
        &self,
        context: &PrincipalContext,
        permission: Permission,
        target: &Scope,
    ) -> Decision {
        let chain = target.ancestors();
        let matched = context
            .bindings()
            .iter()
            .enumerate()
            .filter(|(_, binding)| self.role_grants(context, &binding.role, permission))
            .filter_map(|(index, binding)| {
                chain
                    .iter()
                    .position(|scope| *scope == binding.scope)
                    .map(|distance| (distance, index, binding))
            })
            .min_by_key(|(distance, index, binding)| {
                (
                    *distance,
                    !binding.role.is_builtin(),
                    binding.granted_at,
                    *index,
                )
            })
            .map(|(_, _, binding)| binding);

        match matched {
            Some(binding) => Decision::allow(binding.clone()),
            None => Decision::deny(self.denial_reason(context, permission)),
        }
    }

    fn denial_reason(&self, context: &PrincipalContext, permission: Permission) -> DenialReason {
        let granted_scopes = granting_scopes(
            context
                .bindings()
                .iter()
                .filter(|binding| self.role_grants(context, &binding.role, permission)),
        );
        if !granted_scopes.is_empty() {
            return DenialReason::ScopeMismatch { granted_scopes };
        }

        context
            .inactive_roles()
            .iter()
            .find(|inactive| self.role_grants(context, &inactive.role, permission))
            .map(|inactive| DenialReason::RoleWithoutBinding {
                role: inactive.role,
            })
            .unwrap_or(DenialReason::NoMatchingRole)
    }

    fn role_grants(
        &self,
        context: &PrincipalContext,
        role: &RoleRef,
        permission: Permission,
    ) -> bool {
        match role {
            RoleRef::Builtin(builtin) => RoleRegistry.grants(*builtin, permission),
            RoleRef::Custom(id) => context
                .custom_role(*id)
                .map(|custom| self.resolver.resolve(custom).contains(&permission))
                .unwrap_or(false),
        }
    }

    fn extend_with_role(
        &self,
        context: &PrincipalContext,
        role: &RoleRef,
        into: &mut PermissionSet,
    ) {
        match role {
            RoleRef::Builtin(builtin) => {
                into.extend(RoleRegistry.permissions_of(*builtin).iter().copied())
            }
            RoleRef::Custom(id) => {
                if let Some(custom) = context.custom_role(*id) {
                    into.extend(self.resolver.resolve(custom).iter().copied());
                }
            }
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(Arc::new(CustomRoleResolver::default()))
    }
}

/// True if any active binding holds one of `roles`, at any scope.
pub fn has_any_role(context: &PrincipalContext, roles: &[RoleRef]) -> bool {
    context
        .bindings()
        .iter()
        .any(|binding| roles.contains(&binding.role))
}

fn granting_scopes<'a>(bindings: impl Iterator<Item = &'a RoleBinding>) -> Vec<Scope> {
    let mut scopes: Vec<Scope> = Vec::new();
    for binding in bindings {
        if !scopes.contains(&binding.scope) {
            scopes.push(binding.scope);
        }
    }
    scopes
}
