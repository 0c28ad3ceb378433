//! Static role policies per domain.
//!
//! The table is compiled into the binary and never changes at runtime. A role
//! missing from the table for a resource type has no access to that type.

use crate::authorization::{Action, PolicyAction, PolicyDomain, ResourceType, Role};

/// One `(role, resource type) -> action` row of the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEntry {
    /// Role the entry applies to.
    pub role: Role,
    /// Resource type the entry applies to.
    pub resource_type: ResourceType,
    /// Allowed action.
    pub action: PolicyAction,
}

const fn entry(role: Role, resource_type: ResourceType, action: PolicyAction) -> PolicyEntry {
    PolicyEntry {
        role,
        resource_type,
        action,
    }
}

const VENDOR_POLICIES: &[PolicyEntry] = &[
    entry(Role::Admin, ResourceType::Vendor, PolicyAction::Any),
    entry(Role::Admin, ResourceType::Game, PolicyAction::Any),
    entry(Role::Admin, ResourceType::Package, PolicyAction::Any),
    entry(Role::Admin, ResourceType::Bundle, PolicyAction::Any),
    entry(Role::Admin, ResourceType::Membership, PolicyAction::Any),
    entry(Role::Admin, ResourceType::Onboarding, PolicyAction::Any),
    entry(Role::Editor, ResourceType::Vendor, PolicyAction::Read),
    entry(Role::Editor, ResourceType::Game, PolicyAction::Any),
    entry(Role::Editor, ResourceType::Package, PolicyAction::Any),
    entry(Role::Editor, ResourceType::Bundle, PolicyAction::Any),
    entry(Role::Editor, ResourceType::Onboarding, PolicyAction::Read),
    entry(Role::Support, ResourceType::Vendor, PolicyAction::Read),
    entry(Role::Support, ResourceType::Game, PolicyAction::Read),
    entry(Role::Support, ResourceType::Package, PolicyAction::Read),
    entry(Role::Support, ResourceType::Bundle, PolicyAction::Read),
    entry(Role::Support, ResourceType::Onboarding, PolicyAction::Read),
    entry(Role::Viewer, ResourceType::Vendor, PolicyAction::Read),
    entry(Role::Viewer, ResourceType::Game, PolicyAction::Read),
    entry(Role::Viewer, ResourceType::Package, PolicyAction::Read),
    entry(Role::Viewer, ResourceType::Bundle, PolicyAction::Read),
    entry(Role::NotApproved, ResourceType::Onboarding, PolicyAction::Read),
];

// Super admins are matched before the table is consulted.
const ADMIN_POLICIES: &[PolicyEntry] = &[];

/// Read-only view over the static policy table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainPolicy;

impl DomainPolicy {
    /// Returns every entry declared for a domain.
    #[must_use]
    pub fn entries(domain: PolicyDomain) -> &'static [PolicyEntry] {
        match domain {
            PolicyDomain::Vendor => VENDOR_POLICIES,
            PolicyDomain::Admin => ADMIN_POLICIES,
        }
    }

    /// Returns the action allowed for `role` on `resource_type`, if any.
    #[must_use]
    pub fn allowed_action(
        domain: PolicyDomain,
        role: Role,
        resource_type: ResourceType,
    ) -> Option<PolicyAction> {
        Self::entries(domain)
            .iter()
            .find(|entry| entry.role == role && entry.resource_type == resource_type)
            .map(|entry| entry.action)
    }

    /// Returns whether `role` may perform `action` on `resource_type`.
    #[must_use]
    pub fn permits(
        domain: PolicyDomain,
        role: Role,
        resource_type: ResourceType,
        action: Action,
    ) -> bool {
        Self::allowed_action(domain, role, resource_type)
            .is_some_and(|allowed| allowed.permits(action))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::DomainPolicy;
    use crate::authorization::{Action, PolicyDomain, ResourceType, Role};

    #[test]
    fn table_has_no_duplicate_rows() {
        let mut seen = HashSet::new();
        for entry in DomainPolicy::entries(PolicyDomain::Vendor) {
            assert!(seen.insert((entry.role, entry.resource_type)));
        }
    }

    #[test]
    fn support_reads_games_but_cannot_write() {
        assert!(DomainPolicy::permits(
            PolicyDomain::Vendor,
            Role::Support,
            ResourceType::Game,
            Action::Read
        ));
        assert!(!DomainPolicy::permits(
            PolicyDomain::Vendor,
            Role::Support,
            ResourceType::Game,
            Action::Write
        ));
    }

    #[test]
    fn not_approved_only_reads_onboarding() {
        let entries: Vec<_> = DomainPolicy::entries(PolicyDomain::Vendor)
            .iter()
            .filter(|entry| entry.role == Role::NotApproved)
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].resource_type, ResourceType::Onboarding);
    }

    #[test]
    fn admin_domain_declares_no_table_rows() {
        assert!(DomainPolicy::entries(PolicyDomain::Admin).is_empty());
    }
}
