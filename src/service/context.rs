//! Principal context builder

use crate::catalog::RoleRegistry;
use crate::domain::{
    BindingId, BindingProblem, BuildWarning, BuiltinRole, InactiveReason, InactiveRole,
    PrincipalContext, RoleBinding, RoleRef, Scope, UserRecord,
};
use crate::error::Result;
use crate::repository::{CustomRoleRepository, OrgDirectory};
use std::collections::HashMap;
use std::sync::Arc;

/// Assembles a [`PrincipalContext`] from an authenticated user record.
///
/// Invalid bindings are dropped one by one (recorded as warnings and as
/// inactive roles); only a failing custom role store aborts the build.
pub struct ContextBuilder<O: OrgDirectory, R: CustomRoleRepository> {
    org: Arc<O>,
    custom_roles: Arc<R>,
    enforce_tenant_membership: bool,
}

impl<O: OrgDirectory, R: CustomRoleRepository> ContextBuilder<O, R> {
    pub fn new(org: Arc<O>, custom_roles: Arc<R>) -> Self {
        Self {
            org,
            custom_roles,
            enforce_tenant_membership: true,
        }
    }

    /// When enabled (default), a tenant-scoped binding for a tenant the user
    /// is not a member of is malformed.
    pub fn enforce_tenant_membership(mut self, enabled: bool) -> Self {
        self.enforce_tenant_membership = enabled;
        self
    }

    pub fn build(&self, user: &UserRecord) -> Result<PrincipalContext> {
        let mut context = PrincipalContext {
            user_id: user.id,
            tenant_ids: user.tenant_ids.clone(),
            bindings: Vec::with_capacity(
                user.role_assignments.len() + user.custom_role_assignments.len(),
            ),
            custom_roles: HashMap::new(),
            inactive: vec![],
            warnings: vec![],
        };

        for assignment in &user.role_assignments {
            let role = RoleRef::Builtin(assignment.role);
            if assignment.revoked_at.is_some() {
                context.inactive.push(InactiveRole {
                    binding_id: assignment.id,
                    role,
                    reason: InactiveReason::Revoked,
                });
                continue;
            }

            let problem = check_class(assignment.role, &assignment.scope)
                .or_else(|| self.check_path(user, &assignment.scope));
            match problem {
                Some(problem) => self.drop_malformed(&mut context, assignment.id, role, problem),
                None => context.bindings.push(RoleBinding {
                    id: assignment.id,
                    role,
                    scope: assignment.scope,
                    granted_at: assignment.granted_at,
                }),
            }
        }

        for assignment in &user.custom_role_assignments {
            let role = RoleRef::Custom(assignment.custom_role_id);
            let Some(custom) = self.custom_roles.find(assignment.custom_role_id)? else {
                tracing::warn!(
                    user_id = %user.id,
                    binding_id = %assignment.id,
                    custom_role_id = %assignment.custom_role_id,
                    "Dropping assignment of unknown custom role"
                );
                context.warnings.push(BuildWarning::UnknownCustomRole {
                    binding_id: assignment.id,
                    custom_role_id: assignment.custom_role_id,
                });
                continue;
            };
            let tenant_id = custom.tenant_id;
            context.custom_roles.insert(custom.id, custom);

            if assignment.revoked_at.is_some() {
                context.inactive.push(InactiveRole {
                    binding_id: assignment.id,
                    role,
                    reason: InactiveReason::Revoked,
                });
                continue;
            }

            let scope = match (assignment.farm_id, assignment.barn_id) {
                (None, None) => Scope::tenant(tenant_id),
                (Some(farm_id), None) => Scope::farm(tenant_id, farm_id),
                (Some(farm_id), Some(barn_id)) => Scope::barn(tenant_id, farm_id, barn_id),
                (None, Some(barn_id)) => {
                    self.drop_malformed(
                        &mut context,
                        assignment.id,
                        role,
                        BindingProblem::BarnWithoutFarm { barn_id },
                    );
                    continue;
                }
            };

            match self.check_path(user, &scope) {
                Some(problem) => self.drop_malformed(&mut context, assignment.id, role, problem),
                None => context.bindings.push(RoleBinding {
                    id: assignment.id,
                    role,
                    scope,
                    granted_at: assignment.granted_at,
                }),
            }
        }

        tracing::debug!(
            user_id = %user.id,
            bindings = context.bindings.len(),
            inactive = context.inactive.len(),
            warnings = context.warnings.len(),
            "Built principal context"
        );
        Ok(context)
    }

    /// Checks membership and that every id in the path belongs to its parent.
    fn check_path(&self, user: &UserRecord, scope: &Scope) -> Option<BindingProblem> {
        let tenant_id = scope.tenant_id()?;
        if self.enforce_tenant_membership && !user.tenant_ids.contains(&tenant_id) {
            return Some(BindingProblem::TenantNotMember { tenant_id });
        }

        let farm_id = scope.farm_id()?;
        match self.org.farm_tenant(farm_id) {
            None => return Some(BindingProblem::UnknownFarm { farm_id }),
            Some(owner) if owner != tenant_id => {
                return Some(BindingProblem::FarmNotInTenant { farm_id, tenant_id })
            }
            Some(_) => {}
        }

        let barn_id = scope.barn_id()?;
        match self.org.barn_farm(barn_id) {
            None => Some(BindingProblem::UnknownBarn { barn_id }),
            Some(owner) if owner != farm_id => {
                Some(BindingProblem::BarnNotInFarm { barn_id, farm_id })
            }
            Some(_) => None,
        }
    }

    fn drop_malformed(
        &self,
        context: &mut PrincipalContext,
        binding_id: BindingId,
        role: RoleRef,
        problem: BindingProblem,
    ) {
        tracing::warn!(
            user_id = %context.user_id,
            binding_id = %binding_id,
            role = %role,
            problem = problem.kind(),
            "Dropping malformed role binding: {}",
            problem
        );
        metrics::counter!("farmgate_malformed_bindings_total", "kind" => problem.kind())
            .increment(1);

        context.inactive.push(InactiveRole {
            binding_id,
            role,
            reason: InactiveReason::Malformed,
        });
        context.warnings.push(BuildWarning::MalformedBinding {
            binding_id,
            role,
            problem,
        });
    }
}

fn check_class(role: BuiltinRole, scope: &Scope) -> Option<BindingProblem> {
    let class = scope.class();
    if RoleRegistry.allows_binding_class(role, class) {
        None
    } else {
        Some(BindingProblem::ScopeClassNotAllowed {
            class,
            min: RoleRegistry.min_scope_class(role),
            max: RoleRegistry.max_scope_class(role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BarnId, CustomRole, CustomRoleAssignment, CustomRoleId, FarmId, RoleAssignment, TenantId,
        UserId,
    };
    use crate::error::AppError;
    use crate::repository::custom_role::MockCustomRoleRepository;
    use crate::repository::org::MockOrgDirectory;
    use crate::repository::{InMemoryCustomRoleRepository, InMemoryOrgDirectory};
    use chrono::Utc;

    struct Fixture {
        tenant: TenantId,
        farm: FarmId,
        barn: BarnId,
        other_tenant: TenantId,
        other_farm: FarmId,
    }

    fn fixture() -> Fixture {
        Fixture {
            tenant: TenantId::new_v4(),
            farm: FarmId::new_v4(),
            barn: BarnId::new_v4(),
            other_tenant: TenantId::new_v4(),
            other_farm: FarmId::new_v4(),
        }
    }

    fn directory(f: &Fixture) -> InMemoryOrgDirectory {
        InMemoryOrgDirectory::new()
            .with_farm(f.tenant, f.farm)
            .with_farm(f.other_tenant, f.other_farm)
            .with_barn(f.farm, f.barn)
    }

    fn assignment(role: BuiltinRole, scope: Scope) -> RoleAssignment {
        RoleAssignment {
            id: BindingId::new_v4(),
            role,
            scope,
            granted_at: Utc::now(),
            revoked_at: None,
        }
    }

    fn user(f: &Fixture) -> UserRecord {
        UserRecord {
            tenant_ids: vec![f.tenant, f.other_tenant],
            ..UserRecord::new(UserId::new_v4())
        }
    }

    fn builder(
        f: &Fixture,
        roles: InMemoryCustomRoleRepository,
    ) -> ContextBuilder<InMemoryOrgDirectory, InMemoryCustomRoleRepository> {
        ContextBuilder::new(Arc::new(directory(f)), Arc::new(roles))
    }

    #[test]
    fn test_valid_bindings_are_kept_in_order() {
        let f = fixture();
        let mut u = user(&f);
        u.role_assignments = vec![
            assignment(BuiltinRole::TenantAdmin, Scope::tenant(f.tenant)),
            assignment(BuiltinRole::FarmManager, Scope::farm(f.tenant, f.farm)),
            assignment(BuiltinRole::BarnOperator, Scope::barn(f.tenant, f.farm, f.barn)),
        ];

        let ctx = builder(&f, InMemoryCustomRoleRepository::new()).build(&u).unwrap();

        assert_eq!(ctx.bindings().len(), 3);
        assert_eq!(ctx.bindings()[1].role, RoleRef::Builtin(BuiltinRole::FarmManager));
        assert!(ctx.warnings().is_empty());
        assert!(ctx.inactive_roles().is_empty());
    }

    #[test]
    fn test_farm_of_other_tenant_is_dropped_but_others_survive() {
        let f = fixture();
        let mut u = user(&f);
        let bad = assignment(BuiltinRole::FarmManager, Scope::farm(f.tenant, f.other_farm));
        let bad_id = bad.id;
        u.role_assignments = vec![
            bad,
            assignment(BuiltinRole::Veterinarian, Scope::farm(f.tenant, f.farm)),
        ];

        let ctx = builder(&f, InMemoryCustomRoleRepository::new()).build(&u).unwrap();

        assert_eq!(ctx.bindings().len(), 1);
        assert_eq!(
            ctx.warnings(),
            &[BuildWarning::MalformedBinding {
                binding_id: bad_id,
                role: RoleRef::Builtin(BuiltinRole::FarmManager),
                problem: BindingProblem::FarmNotInTenant {
                    farm_id: f.other_farm,
                    tenant_id: f.tenant,
                },
            }]
        );
        assert_eq!(ctx.inactive_roles()[0].reason, InactiveReason::Malformed);
    }

    #[test]
    fn test_role_bound_outside_its_class_bounds_is_dropped() {
        let f = fixture();
        let mut u = user(&f);
        u.role_assignments = vec![
            assignment(BuiltinRole::PlatformAdmin, Scope::tenant(f.tenant)),
            assignment(BuiltinRole::FarmManager, Scope::Global),
            assignment(BuiltinRole::TenantAdmin, Scope::farm(f.tenant, f.farm)),
        ];

        let ctx = builder(&f, InMemoryCustomRoleRepository::new()).build(&u).unwrap();

        assert!(ctx.bindings().is_empty());
        assert_eq!(ctx.warnings().len(), 3);
        assert!(ctx.warnings().iter().all(|w| matches!(
            w,
            BuildWarning::MalformedBinding {
                problem: BindingProblem::ScopeClassNotAllowed { .. },
                ..
            }
        )));
    }

    #[test]
    fn test_unknown_farm_and_barn() {
        let f = fixture();
        let mut u = user(&f);
        let stray_farm = FarmId::new_v4();
        let stray_barn = BarnId::new_v4();
        u.role_assignments = vec![
            assignment(BuiltinRole::FarmManager, Scope::farm(f.tenant, stray_farm)),
            assignment(
                BuiltinRole::BarnOperator,
                Scope::barn(f.tenant, f.farm, stray_barn),
            ),
        ];

        let ctx = builder(&f, InMemoryCustomRoleRepository::new()).build(&u).unwrap();

        let problems: Vec<&str> = ctx
            .warnings()
            .iter()
            .filter_map(|w| match w {
                BuildWarning::MalformedBinding { problem, .. } => Some(problem.kind()),
                _ => None,
            })
            .collect();
        assert_eq!(problems, vec!["unknown_farm", "unknown_barn"]);
    }

    #[test]
    fn test_barn_of_other_farm() {
        let f = fixture();
        let mut u = user(&f);
        let sibling_farm = FarmId::new_v4();
        let org = directory(&f).with_farm(f.tenant, sibling_farm);
        u.role_assignments = vec![assignment(
            BuiltinRole::BarnOperator,
            Scope::barn(f.tenant, sibling_farm, f.barn),
        )];

        let ctx = ContextBuilder::new(Arc::new(org), Arc::new(InMemoryCustomRoleRepository::new()))
            .build(&u)
            .unwrap();

        assert!(matches!(
            ctx.warnings()[0],
            BuildWarning::MalformedBinding {
                problem: BindingProblem::BarnNotInFarm { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_tenant_membership_enforcement() {
        let f = fixture();
        let mut u = user(&f);
        u.tenant_ids = vec![f.other_tenant];
        u.role_assignments = vec![assignment(BuiltinRole::TenantAdmin, Scope::tenant(f.tenant))];

        let strict = builder(&f, InMemoryCustomRoleRepository::new()).build(&u).unwrap();
        assert!(strict.bindings().is_empty());

        let relaxed = builder(&f, InMemoryCustomRoleRepository::new())
            .enforce_tenant_membership(false)
            .build(&u)
            .unwrap();
        assert_eq!(relaxed.bindings().len(), 1);
    }

    #[test]
    fn test_global_binding_skips_org_lookups() {
        let f = fixture();
        let mut u = user(&f);
        u.tenant_ids.clear();
        u.role_assignments = vec![assignment(BuiltinRole::PlatformAdmin, Scope::Global)];

        // Any org lookup would panic on a mock without expectations.
        let ctx = ContextBuilder::new(
            Arc::new(MockOrgDirectory::new()),
            Arc::new(InMemoryCustomRoleRepository::new()),
        )
        .build(&u)
        .unwrap();

        assert_eq!(ctx.bindings().len(), 1);
    }

    #[test]
    fn test_revoked_assignment_is_inactive_without_warning() {
        let f = fixture();
        let mut u = user(&f);
        let mut revoked = assignment(BuiltinRole::FarmManager, Scope::farm(f.tenant, f.farm));
        revoked.revoked_at = Some(Utc::now());
        u.role_assignments = vec![revoked];

        let ctx = builder(&f, InMemoryCustomRoleRepository::new()).build(&u).unwrap();

        assert!(ctx.bindings().is_empty());
        assert!(ctx.warnings().is_empty());
        assert_eq!(ctx.inactive_roles()[0].reason, InactiveReason::Revoked);
    }

    #[test]
    fn test_custom_role_binding_is_scoped_to_owning_tenant() {
        let f = fixture();
        let custom = CustomRole {
            tenant_id: f.tenant,
            name: "Feed technician".to_string(),
            base_role: Some(BuiltinRole::ReadOnly),
            ..Default::default()
        };
        let mut u = user(&f);
        u.custom_role_assignments = vec![
            CustomRoleAssignment {
                id: BindingId::new_v4(),
                custom_role_id: custom.id,
                farm_id: None,
                barn_id: None,
                granted_at: Utc::now(),
                revoked_at: None,
            },
            CustomRoleAssignment {
                id: BindingId::new_v4(),
                custom_role_id: custom.id,
                farm_id: Some(f.farm),
                barn_id: Some(f.barn),
                granted_at: Utc::now(),
                revoked_at: None,
            },
        ];

        let ctx = builder(&f, InMemoryCustomRoleRepository::with_roles([custom.clone()]))
            .build(&u)
            .unwrap();

        assert_eq!(ctx.bindings()[0].scope, Scope::tenant(f.tenant));
        assert_eq!(ctx.bindings()[1].scope, Scope::barn(f.tenant, f.farm, f.barn));
        assert_eq!(ctx.custom_role(custom.id), Some(&custom));
    }

    #[test]
    fn test_custom_role_narrowed_to_foreign_farm_is_dropped() {
        let f = fixture();
        let custom = CustomRole {
            tenant_id: f.tenant,
            name: "Scout".to_string(),
            ..Default::default()
        };
        let mut u = user(&f);
        u.custom_role_assignments = vec![CustomRoleAssignment {
            id: BindingId::new_v4(),
            custom_role_id: custom.id,
            farm_id: Some(f.other_farm),
            barn_id: None,
            granted_at: Utc::now(),
            revoked_at: None,
        }];

        let ctx = builder(&f, InMemoryCustomRoleRepository::with_roles([custom]))
            .build(&u)
            .unwrap();

        assert!(ctx.bindings().is_empty());
        assert_eq!(ctx.warnings().len(), 1);
    }

    #[test]
    fn test_custom_role_barn_without_farm() {
        let f = fixture();
        let custom = CustomRole {
            tenant_id: f.tenant,
            name: "Scout".to_string(),
            ..Default::default()
        };
        let mut u = user(&f);
        u.custom_role_assignments = vec![CustomRoleAssignment {
            id: BindingId::new_v4(),
            custom_role_id: custom.id,
            farm_id: None,
            barn_id: Some(f.barn),
            granted_at: Utc::now(),
            revoked_at: None,
        }];

        let ctx = builder(&f, InMemoryCustomRoleRepository::with_roles([custom]))
            .build(&u)
            .unwrap();

        assert!(matches!(
            ctx.warnings()[0],
            BuildWarning::MalformedBinding {
                problem: BindingProblem::BarnWithoutFarm { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_custom_role_is_warned() {
        let f = fixture();
        let missing = CustomRoleId::new_v4();
        let mut u = user(&f);
        u.custom_role_assignments = vec![CustomRoleAssignment {
            id: BindingId::new_v4(),
            custom_role_id: missing,
            farm_id: None,
            barn_id: None,
            granted_at: Utc::now(),
            revoked_at: None,
        }];

        let ctx = builder(&f, InMemoryCustomRoleRepository::new()).build(&u).unwrap();

        assert!(ctx.bindings().is_empty());
        assert!(ctx.inactive_roles().is_empty());
        assert!(matches!(
            ctx.warnings()[0],
            BuildWarning::UnknownCustomRole { custom_role_id, .. } if custom_role_id == missing
        ));
    }

    #[test]
    fn test_store_failure_aborts_build() {
        let f = fixture();
        let mut repo = MockCustomRoleRepository::new();
        repo.expect_find()
            .returning(|_| Err(AppError::Internal(anyhow::anyhow!("store unavailable"))));
        let mut u = user(&f);
        u.custom_role_assignments = vec![CustomRoleAssignment {
            id: BindingId::new_v4(),
            custom_role_id: CustomRoleId::new_v4(),
            farm_id: None,
            barn_id: None,
            granted_at: Utc::now(),
            revoked_at: None,
        }];

        let result = ContextBuilder::new(Arc::new(directory(&f)), Arc::new(repo)).build(&u);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
