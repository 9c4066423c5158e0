//! JSON snapshot of organization, custom role and user data.
//!
//! Lets the CLI (and tests) evaluate decisions against a fixed dataset
//! without a backing store.

use super::custom_role::InMemoryCustomRoleRepository;
use super::org::InMemoryOrgDirectory;
use crate::domain::{BarnId, CustomRole, FarmId, TenantId, UserId, UserRecord};
use crate::error::{AppError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct FarmRecord {
    pub id: FarmId,
    pub tenant_id: TenantId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BarnRecord {
    pub id: BarnId,
    pub farm_id: FarmId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub farms: Vec<FarmRecord>,
    #[serde(default)]
    pub barns: Vec<BarnRecord>,
    #[serde(default)]
    pub custom_roles: Vec<CustomRole>,
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AppError::Validation(format!("Invalid snapshot: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = Self::from_json(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        tracing::info!(
            farms = snapshot.farms.len(),
            barns = snapshot.barns.len(),
            custom_roles = snapshot.custom_roles.len(),
            users = snapshot.users.len(),
            "Loaded snapshot from {}",
            path.display()
        );
        Ok(snapshot)
    }

    pub fn org_directory(&self) -> InMemoryOrgDirectory {
        let directory = self
            .farms
            .iter()
            .fold(InMemoryOrgDirectory::new(), |dir, farm| {
                dir.with_farm(farm.tenant_id, farm.id)
            });
        self.barns
            .iter()
            .fold(directory, |dir, barn| dir.with_barn(barn.farm_id, barn.id))
    }

    pub fn custom_role_repository(&self) -> InMemoryCustomRoleRepository {
        InMemoryCustomRoleRepository::with_roles(self.custom_roles.iter().cloned())
    }

    pub fn user(&self, id: UserId) -> Result<&UserRecord> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found in snapshot", id)))
    }
}
