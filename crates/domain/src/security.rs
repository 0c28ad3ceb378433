use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role grant is created or extended.
    SecurityRoleGranted,
    /// Emitted when a role grant is narrowed or deleted.
    SecurityRoleRevoked,
    /// Emitted when a vendor completes onboarding.
    VendorApproved,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleGranted => "security.role.granted",
            Self::SecurityRoleRevoked => "security.role.revoked",
            Self::VendorApproved => "vendor.approved",
        }
    }
}
