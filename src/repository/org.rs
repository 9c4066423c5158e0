//! Organization tree lookups (which tenant owns a farm, which farm owns a barn)

use crate::domain::{BarnId, FarmId, TenantId};
use std::collections::HashMap;

/// Caller-supplied view of the tenant / farm / barn hierarchy
#[cfg_attr(test, mockall::automock)]
pub trait OrgDirectory: Send + Sync {
    fn farm_tenant(&self, farm_id: FarmId) -> Option<TenantId>;
    fn barn_farm(&self, barn_id: BarnId) -> Option<FarmId>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryOrgDirectory {
    farms: HashMap<FarmId, TenantId>,
    barns: HashMap<BarnId, FarmId>,
}

impl InMemoryOrgDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_farm(mut self, tenant_id: TenantId, farm_id: FarmId) -> Self {
        self.farms.insert(farm_id, tenant_id);
        self
    }

    pub fn with_barn(mut self, farm_id: FarmId, barn_id: BarnId) -> Self {
        self.barns.insert(barn_id, farm_id);
        self
    }
}

impl OrgDirectory for InMemoryOrgDirectory {
    fn farm_tenant(&self, farm_id: FarmId) -> Option<TenantId> {
        self.farms.get(&farm_id).copied()
    }

    fn barn_farm(&self, barn_id: BarnId) -> Option<FarmId> {
        self.barns.get(&barn_id).copied()
    }
}
