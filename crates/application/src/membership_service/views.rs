use super::*;

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use vendorhub_domain::{
    Action, AllowReason, AuthorizationContext, BundleId, Decision, GLOBAL_MARKER, GameId,
    PackageId, ResourceType, Restriction, RoleGrant, evaluate,
};

/// Display metadata of a restricted resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMeta {
    /// Resource display name.
    pub name: String,
}

/// Resource a role applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceView {
    /// Resource id, or `*` for a global grant.
    pub id: String,
    /// Resource type, absent for a global grant.
    pub resource_type: Option<ResourceType>,
    /// Owner of the grant.
    pub owner: Owner,
    /// Resolved display metadata, absent for a global grant.
    pub meta: Option<ResourceMeta>,
}

/// One (role, resource) pair held by a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleView {
    /// Granted role.
    pub role: Role,
    /// Policy namespace.
    pub domain: PolicyDomain,
    /// Resource the role applies to.
    pub resource: ResourceView,
}

/// Aggregated roles of one vendor member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleView {
    /// Member principal.
    pub user_id: PrincipalId,
    /// Member email, when known.
    pub email: Option<String>,
    /// Member display name.
    pub name: String,
    /// Flattened role and resource pairs.
    pub roles: Vec<RoleView>,
}

/// Effective permissions of one user within one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionsSnapshot {
    /// Vendor the snapshot is scoped to.
    pub vendor_id: VendorId,
    /// Subject of the snapshot.
    pub user_id: PrincipalId,
    /// Owner of the vendor's resources.
    pub owner: Owner,
    /// Whether the user manages the vendor.
    pub is_owner: bool,
    /// Whether the user holds the global super admin grant.
    pub is_super_admin: bool,
    /// False while the user holds `not_approved` for the vendor.
    pub onboarding_complete: bool,
    /// Vendor-domain grants the user holds for this owner.
    pub grants: Vec<RoleGrant>,
}

impl PermissionsSnapshot {
    /// Evaluates an action on one of the vendor's resources.
    #[must_use]
    pub fn decision(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        action: Action,
    ) -> Decision {
        let context = AuthorizationContext {
            domain: PolicyDomain::Vendor,
            user: self.user_id,
            resource_type,
            resource_id: resource_id.to_owned(),
            resource_owner: self.owner,
            action,
        };

        match evaluate(&context, self.grants.as_slice()) {
            Decision::Deny if self.is_super_admin => Decision::Allow(AllowReason::SuperAdmin),
            decision => decision,
        }
    }

    /// Returns whether an action on one of the vendor's resources is allowed.
    #[must_use]
    pub fn allows(&self, resource_type: ResourceType, resource_id: &str, action: Action) -> bool {
        self.decision(resource_type, resource_id, action)
            .is_allowed()
    }

    /// Returns whether the action is allowed on at least one resource of the
    /// type, either vendor-wide or through a grant restricted to it.
    #[must_use]
    pub fn allows_any(&self, resource_type: ResourceType, action: Action) -> bool {
        let vendor_id = self.vendor_id.to_string();
        if self.allows(resource_type, vendor_id.as_str(), action) {
            return true;
        }

        self.grants
            .iter()
            .filter_map(|grant| grant.restriction.resources())
            .flatten()
            .filter(|resource| resource.resource_type == resource_type)
            .any(|resource| self.allows(resource_type, resource.resource_id.as_str(), action))
    }

    /// Returns whether the user may change the vendor's memberships.
    #[must_use]
    pub fn can_manage_members(&self) -> bool {
        self.allows(
            ResourceType::Membership,
            self.vendor_id.to_string().as_str(),
            Action::Write,
        )
    }
}

impl MembershipService {
    /// Lists every member holding a role for the vendor's resources.
    ///
    /// Resource metadata is resolved once per distinct resource within the
    /// call. Any lookup failure fails the whole call.
    pub async fn get_users(&self, vendor_id: VendorId) -> AppResult<Vec<UserRoleView>> {
        let vendor = self.ownership.require_vendor(vendor_id).await?;
        let owner = Owner::Principal(vendor.manager);

        let mut grants_by_user: BTreeMap<PrincipalId, Vec<RoleGrant>> = BTreeMap::new();
        for grant in self
            .policy_store
            .grants_for_owner(PolicyDomain::Vendor, owner)
            .await?
        {
            if Role::membership_roles().contains(&grant.role) {
                grants_by_user.entry(grant.user).or_default().push(grant);
            }
        }

        let mut meta_cache: HashMap<ResourceRef, ResourceMeta> = HashMap::new();
        let mut views = Vec::with_capacity(grants_by_user.len());
        for (user_id, mut grants) in grants_by_user {
            let account = self.require_user(user_id).await?;
            grants.sort_by_key(|grant| grant.role);

            let mut roles = Vec::new();
            for grant in grants {
                match &grant.restriction {
                    Restriction::Wildcard => roles.push(RoleView {
                        role: grant.role,
                        domain: grant.domain,
                        resource: ResourceView {
                            id: GLOBAL_MARKER.to_owned(),
                            resource_type: None,
                            owner: grant.owner,
                            meta: None,
                        },
                    }),
                    Restriction::Resources(resources) => {
                        for resource in resources {
                            let meta = match meta_cache.get(resource) {
                                Some(meta) => meta.clone(),
                                None => {
                                    let meta = self.resource_meta(resource).await?;
                                    meta_cache.insert(resource.clone(), meta.clone());
                                    meta
                                }
                            };

                            roles.push(RoleView {
                                role: grant.role,
                                domain: grant.domain,
                                resource: ResourceView {
                                    id: resource.resource_id.clone(),
                                    resource_type: Some(resource.resource_type),
                                    owner: grant.owner,
                                    meta: Some(meta),
                                },
                            });
                        }
                    }
                }
            }

            views.push(UserRoleView {
                user_id,
                email: account.email.map(|email| email.as_str().to_owned()),
                name: account.display_name,
                roles,
            });
        }

        views.sort_by(|left, right| {
            left.name
                .to_lowercase()
                .cmp(&right.name.to_lowercase())
                .then(left.user_id.cmp(&right.user_id))
        });

        Ok(views)
    }

    /// Returns the effective permissions of one user within a vendor.
    pub async fn get_user_permissions(
        &self,
        vendor_id: VendorId,
        user_id: PrincipalId,
    ) -> AppResult<PermissionsSnapshot> {
        let vendor = self.ownership.require_vendor(vendor_id).await?;
        let owner = Owner::Principal(vendor.manager);
        let is_owner = user_id == vendor.manager;
        if !is_owner {
            self.require_user(user_id).await?;
        }

        let mut grants = self
            .policy_store
            .grants_for_user(user_id, PolicyDomain::Vendor)
            .await?;
        grants.retain(|grant| grant.owner == owner);
        grants.sort_by_key(|grant| grant.role);

        let is_super_admin = self
            .policy_store
            .find_grant(GrantKey::super_admin(user_id))
            .await?
            .is_some();

        Ok(PermissionsSnapshot {
            vendor_id: vendor.id,
            user_id,
            owner,
            is_owner,
            is_super_admin,
            onboarding_complete: !grants.iter().any(|grant| grant.role == Role::NotApproved),
            grants,
        })
    }

    async fn resource_meta(&self, resource: &ResourceRef) -> AppResult<ResourceMeta> {
        let raw_id = resource.resource_id.as_str();
        let name = match resource.resource_type {
            ResourceType::Vendor => {
                self.ownership
                    .require_vendor(VendorId::from_str(raw_id)?)
                    .await?
                    .name
            }
            ResourceType::Game => {
                self.ownership
                    .require_game(GameId::from_str(raw_id)?)
                    .await?
                    .name
            }
            ResourceType::Package => {
                self.ownership
                    .require_package(PackageId::from_str(raw_id)?)
                    .await?
                    .name
            }
            ResourceType::Bundle => {
                self.ownership
                    .require_bundle(BundleId::from_str(raw_id)?)
                    .await?
                    .name
            }
            ResourceType::Membership | ResourceType::Onboarding => {
                return Err(AppError::Internal(format!(
                    "grant restricted to unsupported resource '{resource}'"
                )));
            }
        };

        Ok(ResourceMeta { name })
    }
}
