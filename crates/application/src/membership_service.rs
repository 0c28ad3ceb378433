//! Vendor membership: role grants scoped to a vendor's resources.

use std::collections::BTreeSet;
use std::sync::Arc;

use vendorhub_core::{AppError, AppResult, PrincipalId, UserIdentity};
use vendorhub_domain::{
    AuditAction, GrantKey, Owner, PolicyDomain, ResourceRef, Role, UserAccount, Vendor, VendorId,
};

use crate::{
    AuditEvent, AuditRepository, CatalogRepository, OwnershipService, PolicyStore, UserRepository,
};

mod grants;
mod views;

pub use views::{PermissionsSnapshot, ResourceMeta, ResourceView, RoleView, UserRoleView};

/// Application service orchestrating vendor role grants.
///
/// Route-level authorization happens before these methods are called; the
/// service only validates the request against current state.
#[derive(Clone)]
pub struct MembershipService {
    policy_store: Arc<dyn PolicyStore>,
    ownership: OwnershipService,
    users: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl MembershipService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        policy_store: Arc<dyn PolicyStore>,
        catalog: Arc<dyn CatalogRepository>,
        users: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            policy_store,
            ownership: OwnershipService::new(catalog),
            users,
            audit_repository,
        }
    }

    fn vendor_key(role: Role, user_id: PrincipalId, vendor: &Vendor) -> GrantKey {
        GrantKey {
            role,
            user: user_id,
            domain: PolicyDomain::Vendor,
            owner: Owner::Principal(vendor.manager),
        }
    }

    async fn require_user(&self, user_id: PrincipalId) -> AppResult<UserAccount> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    async fn record(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        vendor_id: VendorId,
        user_id: PrincipalId,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action,
                resource_type: "vendor_membership".to_owned(),
                resource_id: format!("{vendor_id}:{user_id}"),
                detail: Some(detail),
            })
            .await
    }
}

fn ensure_membership_role(role: Role) -> AppResult<()> {
    if Role::membership_roles().contains(&role) {
        return Ok(());
    }

    Err(AppError::Unprocessable(format!(
        "role '{}' cannot be granted through a vendor membership",
        role.as_str()
    )))
}

fn describe(resources: &BTreeSet<ResourceRef>) -> String {
    resources
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
