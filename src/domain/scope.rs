//! Organizational scopes: platform, tenant, farm, barn

use super::common::{BarnId, FarmId, TenantId};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Class of a scope, ordered by breadth: `Barn < Farm < Tenant < Global`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeClass {
    Barn,
    Farm,
    Tenant,
    Global,
}

impl ScopeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeClass::Barn => "barn",
            ScopeClass::Farm => "farm",
            ScopeClass::Tenant => "tenant",
            ScopeClass::Global => "global",
        }
    }
}

impl fmt::Display for ScopeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete scope instance.
///
/// Each variant carries the full path from the tenant down, so a farm scope
/// without a tenant cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum Scope {
    Global,
    Tenant {
        tenant_id: TenantId,
    },
    Farm {
        tenant_id: TenantId,
        farm_id: FarmId,
    },
    Barn {
        tenant_id: TenantId,
        farm_id: FarmId,
        barn_id: BarnId,
    },
}

impl Scope {
    pub fn global() -> Self {
        Scope::Global
    }

    pub fn tenant(tenant_id: TenantId) -> Self {
        Scope::Tenant { tenant_id }
    }

    pub fn farm(tenant_id: TenantId, farm_id: FarmId) -> Self {
        Scope::Farm { tenant_id, farm_id }
    }

    pub fn barn(tenant_id: TenantId, farm_id: FarmId, barn_id: BarnId) -> Self {
        Scope::Barn {
            tenant_id,
            farm_id,
            barn_id,
        }
    }

    pub fn class(&self) -> ScopeClass {
        match self {
            Scope::Global => ScopeClass::Global,
            Scope::Tenant { .. } => ScopeClass::Tenant,
            Scope::Farm { .. } => ScopeClass::Farm,
            Scope::Barn { .. } => ScopeClass::Barn,
        }
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        match self {
            Scope::Global => None,
            Scope::Tenant { tenant_id }
            | Scope::Farm { tenant_id, .. }
            | Scope::Barn { tenant_id, .. } => Some(*tenant_id),
        }
    }

    pub fn farm_id(&self) -> Option<FarmId> {
        match self {
            Scope::Farm { farm_id, .. } | Scope::Barn { farm_id, .. } => Some(*farm_id),
            _ => None,
        }
    }

    pub fn barn_id(&self) -> Option<BarnId> {
        match self {
            Scope::Barn { barn_id, .. } => Some(*barn_id),
            _ => None,
        }
    }

    /// The immediately broader scope, `None` for `Global`.
    pub fn parent(&self) -> Option<Scope> {
        match *self {
            Scope::Global => None,
            Scope::Tenant { .. } => Some(Scope::Global),
            Scope::Farm { tenant_id, .. } => Some(Scope::tenant(tenant_id)),
            Scope::Barn {
                tenant_id, farm_id, ..
            } => Some(Scope::farm(tenant_id, farm_id)),
        }
    }

    /// Containment chain: this scope first, then every broader ancestor, ending with `Global`.
    pub fn ancestors(&self) -> Vec<Scope> {
        let mut chain = vec![*self];
        let mut current = *self;
        while let Some(parent) = current.parent() {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// True if `other` equals this scope or lies underneath it.
    pub fn contains(&self, other: &Scope) -> bool {
        if self.class() < other.class() {
            return false;
        }
        match self {
            Scope::Global => true,
            Scope::Tenant { tenant_id } => other.tenant_id() == Some(*tenant_id),
            Scope::Farm { tenant_id, farm_id } => {
                other.tenant_id() == Some(*tenant_id) && other.farm_id() == Some(*farm_id)
            }
            Scope::Barn { .. } => self == other,
        }
    }

    /// Number of containment steps from this scope up to `ancestor`, if it is one.
    pub fn distance_to(&self, ancestor: &Scope) -> Option<usize> {
        self.ancestors().iter().position(|s| s == ancestor)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Tenant { tenant_id } => write!(f, "tenant:{}", tenant_id),
            Scope::Farm { tenant_id, farm_id } => {
                write!(f, "tenant:{}/farm:{}", tenant_id, farm_id)
            }
            Scope::Barn {
                tenant_id,
                farm_id,
                barn_id,
            } => write!(f, "tenant:{}/farm:{}/barn:{}", tenant_id, farm_id, barn_id),
        }
    }
}

impl FromStr for Scope {
    type Err = AppError;

    /// Parses `global`, `tenant:<id>`, `tenant:<id>/farm:<id>` or
    /// `tenant:<id>/farm:<id>/barn:<id>`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "global" {
            return Ok(Scope::Global);
        }

        let invalid = || AppError::Validation(format!("Invalid scope path '{}'", s));
        let segments: Vec<&str> = s.split('/').collect();

        let tenant = path_segment(&segments, 0, "tenant").ok_or_else(invalid)?;
        let tenant_id = TenantId::parse_str(tenant).map_err(|_| invalid())?;
        match segments.len() {
            1 => Ok(Scope::tenant(tenant_id)),
            2 | 3 => {
                let farm = path_segment(&segments, 1, "farm").ok_or_else(invalid)?;
                let farm_id = FarmId::parse_str(farm).map_err(|_| invalid())?;
                if segments.len() == 2 {
                    return Ok(Scope::farm(tenant_id, farm_id));
                }
                let barn = path_segment(&segments, 2, "barn").ok_or_else(invalid)?;
                let barn_id = BarnId::parse_str(barn).map_err(|_| invalid())?;
                Ok(Scope::barn(tenant_id, farm_id, barn_id))
            }
            _ => Err(invalid()),
        }
    }
}

/// Value of a `label:value` path segment.
fn path_segment<'a>(segments: &[&'a str], index: usize, label: &str) -> Option<&'a str> {
    segments
        .get(index)
        .copied()?
        .strip_prefix(label)?
        .strip_prefix(':')
}
