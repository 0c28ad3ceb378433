use axum::routing::{get, post};
use vendorhub_domain::{PolicyDomain, ResourceType};

use super::RouteRegistry;
use crate::handlers::admin;
use crate::permissions::{OwnerLookup, ResourceParam, RoutePermission};

pub(super) fn register(registry: RouteRegistry) -> RouteRegistry {
    registry
        .route(
            "/api/admin/vendors",
            get(admin::list_all_vendors_handler),
            RoutePermission::new(
                ResourceParam::Global,
                ResourceType::Vendor,
                PolicyDomain::Admin,
                OwnerLookup::Global,
            ),
        )
        .route(
            "/api/admin/vendors/{vendor_id}/approval",
            post(admin::approve_vendor_handler),
            RoutePermission::new(
                ResourceParam::Path("vendor_id"),
                ResourceType::Vendor,
                PolicyDomain::Admin,
                OwnerLookup::Global,
            ),
        )
}
