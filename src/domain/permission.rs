//! Permission and category identifiers

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Ordered set of permissions. Ordering keeps listings and audit output stable.
pub type PermissionSet = BTreeSet<Permission>;

/// Presentation grouping for permissions. Carries no authorization semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    TenantManagement,
    Identity,
    Fleet,
    Operations,
    Compliance,
    Support,
}

impl PermissionCategory {
    pub const ALL: [PermissionCategory; 6] = [
        PermissionCategory::TenantManagement,
        PermissionCategory::Identity,
        PermissionCategory::Fleet,
        PermissionCategory::Operations,
        PermissionCategory::Compliance,
        PermissionCategory::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionCategory::TenantManagement => "tenant_management",
            PermissionCategory::Identity => "identity",
            PermissionCategory::Fleet => "fleet",
            PermissionCategory::Operations => "operations",
            PermissionCategory::Compliance => "compliance",
            PermissionCategory::Support => "support",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PermissionCategory::TenantManagement => "Tenant management",
            PermissionCategory::Identity => "Identity & access",
            PermissionCategory::Fleet => "Fleet",
            PermissionCategory::Operations => "Operations",
            PermissionCategory::Compliance => "Compliance",
            PermissionCategory::Support => "Support",
        }
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained permission identifier.
///
/// Serialized as its SCREAMING_SNAKE code (e.g. `"DEVICE_CONFIGURE"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    // Tenant management
    TenantCreate,
    TenantDelete,
    TenantRead,
    TenantWrite,
    TenantBillingManage,
    PlatformSettingsManage,
    // Identity
    UserRead,
    UserInvite,
    UserWrite,
    RoleAssign,
    CustomRoleManage,
    // Fleet
    FarmRead,
    FarmWrite,
    BarnRead,
    BarnWrite,
    DeviceRead,
    DeviceConfigure,
    DeviceProvision,
    FirmwareUpdate,
    // Operations
    TelemetryRead,
    AlertRead,
    AlertAcknowledge,
    AlertRuleManage,
    ReportRead,
    ReportExport,
    // Compliance
    AuditLogRead,
    HealthRecordRead,
    HealthRecordWrite,
    ComplianceExport,
    // Support
    SupportTicketRead,
    SupportTicketWrite,
    SupportImpersonate,
}

impl Permission {
    pub const ALL: [Permission; 32] = [
        Permission::TenantCreate,
        Permission::TenantDelete,
        Permission::TenantRead,
        Permission::TenantWrite,
        Permission::TenantBillingManage,
        Permission::PlatformSettingsManage,
        Permission::UserRead,
        Permission::UserInvite,
        Permission::UserWrite,
        Permission::RoleAssign,
        Permission::CustomRoleManage,
        Permission::FarmRead,
        Permission::FarmWrite,
        Permission::BarnRead,
        Permission::BarnWrite,
        Permission::DeviceRead,
        Permission::DeviceConfigure,
        Permission::DeviceProvision,
        Permission::FirmwareUpdate,
        Permission::TelemetryRead,
        Permission::AlertRead,
        Permission::AlertAcknowledge,
        Permission::AlertRuleManage,
        Permission::ReportRead,
        Permission::ReportExport,
        Permission::AuditLogRead,
        Permission::HealthRecordRead,
        Permission::HealthRecordWrite,
        Permission::ComplianceExport,
        Permission::SupportTicketRead,
        Permission::SupportTicketWrite,
        Permission::SupportImpersonate,
    ];

    /// Wire code of the permission
    pub fn code(&self) -> &'static str {
        match self {
            Permission::TenantCreate => "TENANT_CREATE",
            Permission::TenantDelete => "TENANT_DELETE",
            Permission::TenantRead => "TENANT_READ",
            Permission::TenantWrite => "TENANT_WRITE",
            Permission::TenantBillingManage => "TENANT_BILLING_MANAGE",
            Permission::PlatformSettingsManage => "PLATFORM_SETTINGS_MANAGE",
            Permission::UserRead => "USER_READ",
            Permission::UserInvite => "USER_INVITE",
            Permission::UserWrite => "USER_WRITE",
            Permission::RoleAssign => "ROLE_ASSIGN",
            Permission::CustomRoleManage => "CUSTOM_ROLE_MANAGE",
            Permission::FarmRead => "FARM_READ",
            Permission::FarmWrite => "FARM_WRITE",
            Permission::BarnRead => "BARN_READ",
            Permission::BarnWrite => "BARN_WRITE",
            Permission::DeviceRead => "DEVICE_READ",
            Permission::DeviceConfigure => "DEVICE_CONFIGURE",
            Permission::DeviceProvision => "DEVICE_PROVISION",
            Permission::FirmwareUpdate => "FIRMWARE_UPDATE",
            Permission::TelemetryRead => "TELEMETRY_READ",
            Permission::AlertRead => "ALERT_READ",
            Permission::AlertAcknowledge => "ALERT_ACKNOWLEDGE",
            Permission::AlertRuleManage => "ALERT_RULE_MANAGE",
            Permission::ReportRead => "REPORT_READ",
            Permission::ReportExport => "REPORT_EXPORT",
            Permission::AuditLogRead => "AUDIT_LOG_READ",
            Permission::HealthRecordRead => "HEALTH_RECORD_READ",
            Permission::HealthRecordWrite => "HEALTH_RECORD_WRITE",
            Permission::ComplianceExport => "COMPLIANCE_EXPORT",
            Permission::SupportTicketRead => "SUPPORT_TICKET_READ",
            Permission::SupportTicketWrite => "SUPPORT_TICKET_WRITE",
            Permission::SupportImpersonate => "SUPPORT_IMPERSONATE",
        }
    }

    pub fn category(&self) -> PermissionCategory {
        use Permission::*;
        match self {
            TenantCreate | TenantDelete | TenantRead | TenantWrite | TenantBillingManage
            | PlatformSettingsManage => PermissionCategory::TenantManagement,
            UserRead | UserInvite | UserWrite | RoleAssign | CustomRoleManage => {
                PermissionCategory::Identity
            }
            FarmRead | FarmWrite | BarnRead | BarnWrite | DeviceRead | DeviceConfigure
            | DeviceProvision | FirmwareUpdate => PermissionCategory::Fleet,
            TelemetryRead | AlertRead | AlertAcknowledge | AlertRuleManage | ReportRead
            | ReportExport => PermissionCategory::Operations,
            AuditLogRead | HealthRecordRead | HealthRecordWrite | ComplianceExport => {
                PermissionCategory::Compliance
            }
            SupportTicketRead | SupportTicketWrite | SupportImpersonate => {
                PermissionCategory::Support
            }
        }
    }

    /// Platform-only permissions can be held through built-in global roles but
    /// never granted by a tenant's custom role.
    pub fn is_platform_only(&self) -> bool {
        matches!(
            self,
            Permission::TenantCreate
                | Permission::TenantDelete
                | Permission::PlatformSettingsManage
                | Permission::SupportImpersonate
        )
    }

    pub fn is_read(&self) -> bool {
        self.code().ends_with("_READ")
    }

    /// Look up a permission by its wire code.
    pub fn from_code(code: &str) -> Result<Self> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.code() == code)
            .ok_or_else(|| AppError::UnknownPermission(code.to_string()))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Permission {
    type Err = AppError;
    fn from_str(s: &str) -> Result<Self> {
        Permission::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let codes: BTreeSet<&str> = Permission::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(codes.len(), Permission::ALL.len());
    }

    #[test]
    fn test_from_code_roundtrips_every_permission() {
        for p in Permission::ALL {
            assert_eq!(Permission::from_code(p.code()).unwrap(), p);
        }
    }

    #[test]
    fn test_from_code_unknown() {
        let err = Permission::from_code("NOT_A_REAL_PERMISSION").unwrap_err();
        assert!(matches!(err, AppError::UnknownPermission(ref code) if code == "NOT_A_REAL_PERMISSION"));
    }

    #[test]
    fn test_from_code_is_case_sensitive() {
        assert!(Permission::from_code("tenant_write").is_err());
    }

    #[test]
    fn test_serde_uses_wire_code() {
        let json = serde_json::to_string(&Permission::DeviceConfigure).unwrap();
        assert_eq!(json, "\"DEVICE_CONFIGURE\"");

        let back: Permission = serde_json::from_str("\"TENANT_WRITE\"").unwrap();
        assert_eq!(back, Permission::TenantWrite);
    }

    #[test]
    fn test_every_category_is_populated() {
        for category in PermissionCategory::ALL {
            assert!(
                Permission::ALL.iter().any(|p| p.category() == category),
                "category {} has no permissions",
                category
            );
        }
    }

    #[test]
    fn test_platform_only() {
        assert!(Permission::TenantCreate.is_platform_only());
        assert!(Permission::SupportImpersonate.is_platform_only());
        assert!(!Permission::TenantWrite.is_platform_only());
    }

    #[test]
    fn test_is_read() {
        assert!(Permission::AuditLogRead.is_read());
        assert!(!Permission::ReportExport.is_read());
    }
}
