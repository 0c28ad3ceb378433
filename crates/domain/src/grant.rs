//! Role grants and their evaluation against an authorization context.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use vendorhub_core::{AppError, AppResult, PrincipalId};

use crate::authorization::{
    AllowReason, AuthorizationContext, Decision, Owner, PolicyDomain, ResourceType, Role,
};
use crate::policy::DomainPolicy;

/// Typed reference to one resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Resource family.
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Resource identifier.
    #[serde(rename = "id")]
    pub resource_id: String,
}

impl ResourceRef {
    /// Creates a resource reference.
    #[must_use]
    pub fn new(resource_type: ResourceType, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type,
            resource_id: resource_id.into(),
        }
    }
}

impl Display for ResourceRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}:{}",
            self.resource_type.as_str(),
            self.resource_id
        )
    }
}

/// Subset of an owner's resources a grant applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restriction {
    /// Every resource owned by the grant owner.
    Wildcard,
    /// Only the listed resources. Never empty.
    Resources(BTreeSet<ResourceRef>),
}

/// Effect of adding a grant to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantChange {
    /// No grant existed for the key.
    Created,
    /// The existing restriction set grew.
    Extended,
    /// The existing grant already covered the request.
    Unchanged,
}

/// Effect of removing resources from a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantRemoval {
    /// The restriction set shrank but is not empty.
    Narrowed,
    /// The grant no longer exists.
    Deleted,
}

/// Effect of purging one deleted resource from a restriction set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestrictionPurge {
    /// The resource was not listed.
    Untouched,
    /// The resource was dropped and others remain.
    Narrowed(Restriction),
    /// The resource was the last one listed.
    Emptied,
}

impl Restriction {
    /// Builds a restriction from resources. An empty set means wildcard.
    #[must_use]
    pub fn restricted(resources: impl IntoIterator<Item = ResourceRef>) -> Self {
        let resources: BTreeSet<ResourceRef> = resources.into_iter().collect();
        if resources.is_empty() {
            Self::Wildcard
        } else {
            Self::Resources(resources)
        }
    }

    /// Returns whether the restriction applies to every resource.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Returns the listed resources, or `None` for a wildcard.
    #[must_use]
    pub fn resources(&self) -> Option<&BTreeSet<ResourceRef>> {
        match self {
            Self::Wildcard => None,
            Self::Resources(resources) => Some(resources),
        }
    }

    /// Returns whether the restriction includes the addressed resource.
    #[must_use]
    pub fn covers(&self, resource_type: ResourceType, resource_id: &str) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Resources(resources) => resources.iter().any(|resource| {
                resource.resource_type == resource_type && resource.resource_id == resource_id
            }),
        }
    }

    /// Unions an incoming restriction into an existing one.
    #[must_use]
    pub fn merge(existing: Option<&Self>, incoming: &Self) -> (Self, GrantChange) {
        match (existing, incoming) {
            (None, incoming) => (incoming.clone(), GrantChange::Created),
            (Some(Self::Wildcard), _) => (Self::Wildcard, GrantChange::Unchanged),
            (Some(Self::Resources(_)), Self::Wildcard) => (Self::Wildcard, GrantChange::Extended),
            (Some(Self::Resources(current)), Self::Resources(added)) => {
                if added.is_subset(current) {
                    return (Self::Resources(current.clone()), GrantChange::Unchanged);
                }

                let merged = current.union(added).cloned().collect();
                (Self::Resources(merged), GrantChange::Extended)
            }
        }
    }

    /// Subtracts resources. Returns `None` when nothing remains.
    ///
    /// Fails without applying anything when the restriction is a wildcard or
    /// when any requested resource is not listed.
    pub fn without(&self, removed: &BTreeSet<ResourceRef>) -> AppResult<Option<Self>> {
        let current = match self {
            Self::Wildcard => {
                return Err(AppError::Conflict(
                    "grant applies to every resource and must be revoked globally".to_owned(),
                ));
            }
            Self::Resources(current) => current,
        };

        if let Some(missing) = removed.iter().find(|resource| !current.contains(resource)) {
            return Err(AppError::NotFound(format!(
                "resource '{missing}' is not part of the grant"
            )));
        }

        let remaining: BTreeSet<ResourceRef> = current.difference(removed).cloned().collect();
        Ok((!remaining.is_empty()).then_some(Self::Resources(remaining)))
    }

    /// Drops a deleted resource from the restriction set.
    #[must_use]
    pub fn purge(&self, resource: &ResourceRef) -> RestrictionPurge {
        match self {
            Self::Wildcard => RestrictionPurge::Untouched,
            Self::Resources(current) if !current.contains(resource) => RestrictionPurge::Untouched,
            Self::Resources(current) => {
                let mut remaining = current.clone();
                remaining.remove(resource);
                if remaining.is_empty() {
                    RestrictionPurge::Emptied
                } else {
                    RestrictionPurge::Narrowed(Self::Resources(remaining))
                }
            }
        }
    }
}

/// Unique identity of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrantKey {
    /// Granted role.
    pub role: Role,
    /// Principal holding the role.
    pub user: PrincipalId,
    /// Policy namespace.
    pub domain: PolicyDomain,
    /// Owner whose resources the grant applies to.
    pub owner: Owner,
}

impl GrantKey {
    /// Returns the key of the global super admin grant for a user.
    #[must_use]
    pub fn super_admin(user: PrincipalId) -> Self {
        Self {
            role: Role::SuperAdmin,
            user,
            domain: PolicyDomain::Admin,
            owner: Owner::Global,
        }
    }
}

/// A role held by a user for an owner's resources in one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    /// Granted role.
    pub role: Role,
    /// Principal holding the role.
    pub user: PrincipalId,
    /// Policy namespace.
    pub domain: PolicyDomain,
    /// Owner whose resources the grant applies to.
    pub owner: Owner,
    /// Resources the grant applies to.
    pub restriction: Restriction,
}

impl RoleGrant {
    /// Creates a grant from its key and restriction.
    #[must_use]
    pub fn new(key: GrantKey, restriction: Restriction) -> Self {
        Self {
            role: key.role,
            user: key.user,
            domain: key.domain,
            owner: key.owner,
            restriction,
        }
    }

    /// Returns the identity of this grant.
    #[must_use]
    pub fn key(&self) -> GrantKey {
        GrantKey {
            role: self.role,
            user: self.user,
            domain: self.domain,
            owner: self.owner,
        }
    }

    /// Returns whether the grant allows the context on its own.
    ///
    /// Super admin grants are handled by [`evaluate`] and never satisfy a
    /// context through this method.
    #[must_use]
    pub fn satisfies(&self, context: &AuthorizationContext) -> bool {
        self.user == context.user
            && self.domain == context.domain
            && self.owner == context.resource_owner
            && self
                .restriction
                .covers(context.resource_type, context.resource_id.as_str())
            && DomainPolicy::permits(
                self.domain,
                self.role,
                context.resource_type,
                context.action,
            )
    }
}

/// Evaluates a context against the grants held by the acting user.
///
/// Order: ownership, super admin, the `not_approved` gate, then the first
/// satisfying grant. Absence of an allow is a deny.
#[must_use]
pub fn evaluate(context: &AuthorizationContext, grants: &[RoleGrant]) -> Decision {
    if context.resource_owner.principal() == Some(context.user) {
        return Decision::Allow(AllowReason::Ownership);
    }

    let held = grants.iter().filter(|grant| grant.user == context.user);

    if held.clone().any(|grant| grant.role == Role::SuperAdmin) {
        return Decision::Allow(AllowReason::SuperAdmin);
    }

    let scoped: Vec<&RoleGrant> = held
        .filter(|grant| {
            grant.domain == context.domain && grant.owner == context.resource_owner
        })
        .collect();

    // Unfinished onboarding masks every other grant for the same owner.
    if let Some(gate) = scoped.iter().find(|grant| grant.role == Role::NotApproved) {
        return if gate.satisfies(context) {
            Decision::Allow(AllowReason::Grant(Role::NotApproved))
        } else {
            Decision::Deny
        };
    }

    scoped
        .into_iter()
        .find(|grant| grant.satisfies(context))
        .map_or(Decision::Deny, |grant| {
            Decision::Allow(AllowReason::Grant(grant.role))
        })
}
