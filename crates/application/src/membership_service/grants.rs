use super::*;

use vendorhub_domain::{GrantChange, GrantRemoval, Restriction};

use crate::canonical_resource_id;

impl MembershipService {
    /// Grants a role restricted to specific vendor resources.
    ///
    /// The vendor, every listed resource and the user must exist. The ids are
    /// unioned into any existing grant for the same role; a request the
    /// existing grant already covers fails with `Conflict`.
    pub async fn add_role_to_resources(
        &self,
        actor: &UserIdentity,
        vendor_id: VendorId,
        user_id: PrincipalId,
        resources: Vec<ResourceRef>,
        role: Role,
    ) -> AppResult<GrantChange> {
        ensure_membership_role(role)?;
        let vendor = self.ownership.require_vendor(vendor_id).await?;

        let mut requested = BTreeSet::new();
        for resource in require_resources(resources)? {
            requested.insert(self.resolve_vendor_resource(&vendor, &resource).await?);
        }

        self.require_grantee(&vendor, user_id).await?;

        let change = self
            .policy_store
            .add_grant(
                Self::vendor_key(role, user_id, &vendor),
                Restriction::Resources(requested.clone()),
            )
            .await?;
        if change == GrantChange::Unchanged {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' already holds role '{}' for {}",
                role.as_str(),
                describe(&requested)
            )));
        }

        self.record(
            actor,
            AuditAction::SecurityRoleGranted,
            vendor.id,
            user_id,
            format!(
                "granted role '{}' to '{user_id}' on {}",
                role.as_str(),
                describe(&requested)
            ),
        )
        .await?;

        Ok(change)
    }

    /// Removes specific resources from a restricted grant.
    ///
    /// The grant is deleted when no resources remain. Resource ids are only
    /// parsed, not looked up, so ids of deleted resources can still be
    /// revoked.
    pub async fn remove_role_from_resources(
        &self,
        actor: &UserIdentity,
        vendor_id: VendorId,
        user_id: PrincipalId,
        resources: Vec<ResourceRef>,
        role: Role,
    ) -> AppResult<GrantRemoval> {
        ensure_membership_role(role)?;
        let vendor = self.ownership.require_vendor(vendor_id).await?;

        let mut removed = BTreeSet::new();
        for resource in require_resources(resources)? {
            ensure_instance_scoped(&resource)?;
            removed.insert(ResourceRef::new(
                resource.resource_type,
                canonical_resource_id(resource.resource_type, resource.resource_id.as_str())?,
            ));
        }

        let removal = self
            .policy_store
            .remove_resources(Self::vendor_key(role, user_id, &vendor), removed.clone())
            .await?;

        self.record(
            actor,
            AuditAction::SecurityRoleRevoked,
            vendor.id,
            user_id,
            format!(
                "revoked role '{}' from '{user_id}' on {}",
                role.as_str(),
                describe(&removed)
            ),
        )
        .await?;

        Ok(removal)
    }

    /// Grants a role over every resource of the vendor.
    ///
    /// An existing restricted grant for the same role is widened.
    pub async fn add_role_globally(
        &self,
        actor: &UserIdentity,
        vendor_id: VendorId,
        user_id: PrincipalId,
        role: Role,
    ) -> AppResult<GrantChange> {
        ensure_membership_role(role)?;
        let vendor = self.ownership.require_vendor(vendor_id).await?;
        self.require_grantee(&vendor, user_id).await?;

        let change = self
            .policy_store
            .add_grant(Self::vendor_key(role, user_id, &vendor), Restriction::Wildcard)
            .await?;
        if change == GrantChange::Unchanged {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' already holds role '{}' for every resource of vendor '{vendor_id}'",
                role.as_str()
            )));
        }

        self.record(
            actor,
            AuditAction::SecurityRoleGranted,
            vendor.id,
            user_id,
            format!("granted role '{}' to '{user_id}' globally", role.as_str()),
        )
        .await?;

        Ok(change)
    }

    /// Deletes a role grant for the vendor, whatever its restriction.
    pub async fn remove_role_globally(
        &self,
        actor: &UserIdentity,
        vendor_id: VendorId,
        user_id: PrincipalId,
        role: Role,
    ) -> AppResult<()> {
        ensure_membership_role(role)?;
        let vendor = self.ownership.require_vendor(vendor_id).await?;

        self.policy_store
            .remove_grant(Self::vendor_key(role, user_id, &vendor))
            .await?;

        self.record(
            actor,
            AuditAction::SecurityRoleRevoked,
            vendor.id,
            user_id,
            format!("revoked role '{}' from '{user_id}' globally", role.as_str()),
        )
        .await
    }

    /// Ensures the user holds the global super admin grant.
    ///
    /// Returns `true` when the grant was created by this call.
    pub async fn ensure_super_admin(&self, user_id: PrincipalId) -> AppResult<bool> {
        self.require_user(user_id).await?;

        let change = self
            .policy_store
            .add_grant(GrantKey::super_admin(user_id), Restriction::Wildcard)
            .await?;

        Ok(change == GrantChange::Created)
    }

    async fn require_grantee(&self, vendor: &Vendor, user_id: PrincipalId) -> AppResult<()> {
        if user_id == vendor.manager {
            return Err(AppError::Unprocessable(format!(
                "user '{user_id}' manages vendor '{}' and already owns its resources",
                vendor.id
            )));
        }

        self.require_user(user_id).await.map(|_| ())
    }

    async fn resolve_vendor_resource(
        &self,
        vendor: &Vendor,
        resource: &ResourceRef,
    ) -> AppResult<ResourceRef> {
        ensure_instance_scoped(resource)?;

        let ownership = self
            .ownership
            .resolve(resource.resource_type, resource.resource_id.as_str())
            .await?;
        if ownership.vendor_id != vendor.id {
            return Err(AppError::NotFound(format!(
                "{resource} not found under vendor '{}'",
                vendor.id
            )));
        }

        Ok(ResourceRef::new(resource.resource_type, ownership.resource_id))
    }
}

fn require_resources(resources: Vec<ResourceRef>) -> AppResult<Vec<ResourceRef>> {
    if resources.is_empty() {
        return Err(AppError::Unprocessable(
            "at least one resource is required".to_owned(),
        ));
    }

    Ok(resources)
}

fn ensure_instance_scoped(resource: &ResourceRef) -> AppResult<()> {
    if resource.resource_type.is_instance_scoped() {
        return Ok(());
    }

    Err(AppError::Unprocessable(format!(
        "resource type '{}' cannot restrict a grant",
        resource.resource_type.as_str()
    )))
}
