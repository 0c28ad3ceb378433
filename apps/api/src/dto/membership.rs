use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use vendorhub_application::{PermissionsSnapshot, ResourceView, RoleView, UserRoleView};
use vendorhub_core::AppError;
use vendorhub_domain::{Action, ResourceRef, ResourceType, RoleGrant};

/// Typed resource reference on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resource-ref.ts"
)]
pub struct ResourceRefPayload {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl TryFrom<ResourceRefPayload> for ResourceRef {
    type Error = AppError;

    fn try_from(payload: ResourceRefPayload) -> Result<Self, Self::Error> {
        let resource_type = ResourceType::from_str(payload.resource_type.as_str()).map_err(|_| {
            AppError::Unprocessable(format!(
                "unknown resource type '{}'",
                payload.resource_type
            ))
        })?;

        Ok(ResourceRef::new(resource_type, payload.id))
    }
}

impl From<&ResourceRef> for ResourceRefPayload {
    fn from(resource: &ResourceRef) -> Self {
        Self {
            resource_type: resource.resource_type.as_str().to_owned(),
            id: resource.resource_id.clone(),
        }
    }
}

/// Incoming payload for granting or revoking a vendor role.
///
/// Without `resources` the role applies to every resource of the vendor.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-mutation-request.ts"
)]
pub struct RoleMutationRequest {
    pub role: String,
    #[serde(default)]
    pub resources: Option<Vec<ResourceRefPayload>>,
}

/// Display metadata of a restricted resource.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resource-meta-response.ts"
)]
pub struct ResourceMetaResponse {
    pub name: String,
}

/// Resource a member's role applies to.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/member-resource-response.ts"
)]
pub struct MemberResourceResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub owner: String,
    pub meta: Option<ResourceMetaResponse>,
}

impl From<ResourceView> for MemberResourceResponse {
    fn from(view: ResourceView) -> Self {
        Self {
            id: view.id,
            resource_type: view
                .resource_type
                .map(|resource_type| resource_type.as_str().to_owned()),
            owner: view.owner.to_string(),
            meta: view.meta.map(|meta| ResourceMetaResponse { name: meta.name }),
        }
    }
}

/// One role and resource pair held by a member.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/member-role-response.ts"
)]
pub struct MemberRoleResponse {
    pub role: String,
    pub domain: String,
    pub resource: MemberResourceResponse,
}

impl From<RoleView> for MemberRoleResponse {
    fn from(view: RoleView) -> Self {
        Self {
            role: view.role.as_str().to_owned(),
            domain: view.domain.as_str().to_owned(),
            resource: MemberResourceResponse::from(view.resource),
        }
    }
}

/// Aggregated roles of one vendor member.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/member-response.ts"
)]
pub struct MemberResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub name: String,
    pub roles: Vec<MemberRoleResponse>,
}

impl From<UserRoleView> for MemberResponse {
    fn from(view: UserRoleView) -> Self {
        Self {
            user_id: view.user_id.to_string(),
            email: view.email,
            name: view.name,
            roles: view.roles.into_iter().map(MemberRoleResponse::from).collect(),
        }
    }
}

/// One grant inside a permissions snapshot.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-response.ts"
)]
pub struct GrantResponse {
    pub role: String,
    pub wildcard: bool,
    pub resources: Vec<ResourceRefPayload>,
}

impl From<&RoleGrant> for GrantResponse {
    fn from(grant: &RoleGrant) -> Self {
        Self {
            role: grant.role.as_str().to_owned(),
            wildcard: grant.restriction.is_wildcard(),
            resources: grant
                .restriction
                .resources()
                .map(|resources| resources.iter().map(ResourceRefPayload::from).collect())
                .unwrap_or_default(),
        }
    }
}

/// Whether the user can read or write at least one resource of a type.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/capability-response.ts"
)]
pub struct CapabilityResponse {
    pub resource_type: String,
    pub read: bool,
    pub write: bool,
}

/// Effective permissions of one user within one vendor.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permissions-response.ts"
)]
pub struct PermissionsResponse {
    pub vendor_id: String,
    pub user_id: String,
    pub is_owner: bool,
    pub is_super_admin: bool,
    pub onboarding_complete: bool,
    pub can_manage_members: bool,
    pub grants: Vec<GrantResponse>,
    pub capabilities: Vec<CapabilityResponse>,
}

const CAPABILITY_TYPES: [ResourceType; 6] = [
    ResourceType::Vendor,
    ResourceType::Game,
    ResourceType::Package,
    ResourceType::Bundle,
    ResourceType::Membership,
    ResourceType::Onboarding,
];

impl From<PermissionsSnapshot> for PermissionsResponse {
    fn from(snapshot: PermissionsSnapshot) -> Self {
        let capabilities = CAPABILITY_TYPES
            .iter()
            .map(|resource_type| CapabilityResponse {
                resource_type: resource_type.as_str().to_owned(),
                read: snapshot.allows_any(*resource_type, Action::Read),
                write: snapshot.allows_any(*resource_type, Action::Write),
            })
            .collect();

        Self {
            user_id: snapshot.user_id.to_string(),
            is_owner: snapshot.is_owner,
            is_super_admin: snapshot.is_super_admin,
            onboarding_complete: snapshot.onboarding_complete,
            can_manage_members: snapshot.can_manage_members(),
            grants: snapshot.grants.iter().map(GrantResponse::from).collect(),
            capabilities,
            vendor_id: snapshot.vendor_id.to_string(),
        }
    }
}
