use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vendorhub_core::{AppError, PrincipalId};

/// Literal used for domain-global resources and global owners.
pub const GLOBAL_MARKER: &str = "*";

/// Action requested against a resource, derived from the HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Non-mutating access.
    Read,
    /// Any mutation.
    Write,
}

impl Action {
    /// Maps an HTTP method name to an action. `GET` and `HEAD` read, all
    /// other verbs write.
    #[must_use]
    pub fn for_http_method(method: &str) -> Self {
        if method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD") {
            Self::Read
        } else {
            Self::Write
        }
    }

    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Action granted by a policy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    /// Grants reads only.
    Read,
    /// Grants writes only.
    Write,
    /// Grants both reads and writes.
    Any,
}

impl PolicyAction {
    /// Returns whether this policy action satisfies the requested action.
    #[must_use]
    pub fn permits(self, action: Action) -> bool {
        matches!(
            (self, action),
            (Self::Any, _) | (Self::Read, Action::Read) | (Self::Write, Action::Write)
        )
    }

    /// Returns a stable storage value for this policy action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Any => "any",
        }
    }
}

/// Namespace for policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDomain {
    /// Vendor-scoped resources managed by vendor members.
    Vendor,
    /// Platform administration.
    Admin,
}

impl PolicyDomain {
    /// Returns a stable storage value for this domain.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for PolicyDomain {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!(
                "unknown policy domain '{value}'"
            ))),
        }
    }
}

/// Resource families gated by the authorization core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A vendor account.
    Vendor,
    /// A game published by a vendor.
    Game,
    /// A package of games.
    Package,
    /// A bundle of packages.
    Bundle,
    /// Vendor memberships and role grants.
    Membership,
    /// Vendor onboarding documents and messages.
    Onboarding,
}

impl ResourceType {
    /// Returns a stable storage value for this resource type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Game => "game",
            Self::Package => "package",
            Self::Bundle => "bundle",
            Self::Membership => "membership",
            Self::Onboarding => "onboarding",
        }
    }

    /// Returns whether individual instances of this type can appear in a
    /// grant's restriction set.
    #[must_use]
    pub fn is_instance_scoped(&self) -> bool {
        matches!(
            self,
            Self::Vendor | Self::Game | Self::Package | Self::Bundle
        )
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "vendor" => Ok(Self::Vendor),
            "game" => Ok(Self::Game),
            "package" => Ok(Self::Package),
            "bundle" => Ok(Self::Bundle),
            "membership" => Ok(Self::Membership),
            "onboarding" => Ok(Self::Onboarding),
            _ => Err(AppError::Validation(format!(
                "unknown resource type '{value}'"
            ))),
        }
    }
}

/// Roles a principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator; allowed everywhere.
    SuperAdmin,
    /// Full control over an owner's resources.
    Admin,
    /// Manages catalog content.
    Editor,
    /// Read access for customer support.
    Support,
    /// Read-only member.
    Viewer,
    /// Member whose onboarding is not complete.
    NotApproved,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Support => "support",
            Self::Viewer => "viewer",
            Self::NotApproved => "not_approved",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::SuperAdmin,
            Role::Admin,
            Role::Editor,
            Role::Support,
            Role::Viewer,
            Role::NotApproved,
        ];

        ALL
    }

    /// Returns the roles a vendor membership can carry.
    #[must_use]
    pub fn membership_roles() -> &'static [Self] {
        const MEMBERSHIP: &[Role] = &[
            Role::Admin,
            Role::Editor,
            Role::Support,
            Role::Viewer,
            Role::NotApproved,
        ];

        MEMBERSHIP
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "support" => Ok(Self::Support),
            "viewer" => Ok(Self::Viewer),
            "not_approved" => Ok(Self::NotApproved),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Principal that ultimately owns a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Owner {
    /// Resource owned by one principal.
    Principal(PrincipalId),
    /// Platform-wide resource without a principal owner.
    Global,
}

impl Owner {
    /// Returns the owning principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<PrincipalId> {
        match self {
            Self::Principal(principal_id) => Some(*principal_id),
            Self::Global => None,
        }
    }
}

impl From<PrincipalId> for Owner {
    fn from(value: PrincipalId) -> Self {
        Self::Principal(value)
    }
}

impl Display for Owner {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Principal(principal_id) => write!(formatter, "{principal_id}"),
            Self::Global => formatter.write_str(GLOBAL_MARKER),
        }
    }
}

impl FromStr for Owner {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == GLOBAL_MARKER {
            return Ok(Self::Global);
        }

        PrincipalId::from_str(value).map(Self::Principal)
    }
}

/// Per-request tuple evaluated by the authorization service. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    /// Policy namespace.
    pub domain: PolicyDomain,
    /// Acting principal.
    pub user: PrincipalId,
    /// Type of the addressed resource.
    pub resource_type: ResourceType,
    /// Addressed resource id, or `*` for domain-global routes.
    pub resource_id: String,
    /// Resolved owner of the addressed resource.
    pub resource_owner: Owner,
    /// Requested action.
    pub action: Action,
}

/// Why a request was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// The acting principal owns the resource.
    Ownership,
    /// The acting principal is a super admin.
    SuperAdmin,
    /// A role grant matched.
    Grant(Role),
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Access is allowed.
    Allow(AllowReason),
    /// No grant allows the access.
    Deny,
}

impl Decision {
    /// Returns whether the decision allows access.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use vendorhub_core::PrincipalId;

    use super::{Action, Owner, PolicyAction, ResourceType, Role};

    #[test]
    fn get_and_head_are_reads() {
        assert_eq!(Action::for_http_method("GET"), Action::Read);
        assert_eq!(Action::for_http_method("head"), Action::Read);
        assert_eq!(Action::for_http_method("POST"), Action::Write);
        assert_eq!(Action::for_http_method("DELETE"), Action::Write);
    }

    #[test]
    fn any_policy_action_permits_reads_and_writes() {
        assert!(PolicyAction::Any.permits(Action::Read));
        assert!(PolicyAction::Any.permits(Action::Write));
        assert!(PolicyAction::Read.permits(Action::Read));
        assert!(!PolicyAction::Read.permits(Action::Write));
        assert!(!PolicyAction::Write.permits(Action::Read));
    }

    #[test]
    fn role_roundtrip_storage_value() {
        for role in Role::all() {
            let restored = Role::from_str(role.as_str()).ok();
            assert_eq!(restored, Some(*role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(Role::from_str("owner").is_err());
    }

    #[test]
    fn membership_roles_exclude_super_admin() {
        assert!(!Role::membership_roles().contains(&Role::SuperAdmin));
    }

    #[test]
    fn owner_parses_global_marker_and_principals() {
        let principal_id = PrincipalId::new();
        assert_eq!(Owner::from_str("*").ok(), Some(Owner::Global));
        assert_eq!(
            Owner::from_str(principal_id.to_string().as_str()).ok(),
            Some(Owner::Principal(principal_id))
        );
        assert!(Owner::from_str("nobody").is_err());
    }

    #[test]
    fn only_catalog_types_are_instance_scoped() {
        assert!(ResourceType::Game.is_instance_scoped());
        assert!(!ResourceType::Membership.is_instance_scoped());
        assert!(!ResourceType::Onboarding.is_instance_scoped());
    }
}
