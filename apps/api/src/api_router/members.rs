use axum::routing::{get, post};
use vendorhub_domain::{PolicyDomain, ResourceType};

use super::RouteRegistry;
use crate::handlers::members;
use crate::permissions::{OwnerLookup, ResourceParam, RoutePermission};

const MEMBERSHIP: RoutePermission = RoutePermission::new(
    ResourceParam::Path("vendor_id"),
    ResourceType::Membership,
    PolicyDomain::Vendor,
    OwnerLookup::Vendor,
);

const MEMBER_PERMISSIONS: RoutePermission = RoutePermission::new(
    ResourceParam::Path("vendor_id"),
    ResourceType::Membership,
    PolicyDomain::Vendor,
    OwnerLookup::VendorMember,
);

pub(super) fn register(registry: RouteRegistry) -> RouteRegistry {
    registry
        .route(
            "/api/vendors/{vendor_id}/members",
            get(members::list_members_handler),
            MEMBERSHIP,
        )
        .route(
            "/api/vendors/{vendor_id}/members/{user_id}/permissions",
            get(members::member_permissions_handler),
            MEMBER_PERMISSIONS,
        )
        .route(
            "/api/vendors/{vendor_id}/members/{user_id}/roles",
            post(members::add_member_role_handler).delete(members::remove_member_role_handler),
            MEMBERSHIP,
        )
}
