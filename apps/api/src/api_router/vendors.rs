use axum::routing::get;
use vendorhub_domain::{PolicyDomain, ResourceType};

use super::RouteRegistry;
use crate::handlers::vendors;
use crate::permissions::{OwnerLookup, ResourceParam, RoutePermission};

pub(super) fn register(registry: RouteRegistry) -> RouteRegistry {
    registry
        .route(
            "/api/vendors",
            get(vendors::list_vendors_handler).post(vendors::create_vendor_handler),
            RoutePermission::new(
                ResourceParam::Global,
                ResourceType::Vendor,
                PolicyDomain::Vendor,
                OwnerLookup::Caller,
            ),
        )
        .route(
            "/api/vendors/{vendor_id}",
            get(vendors::get_vendor_handler).put(vendors::update_vendor_handler),
            RoutePermission::new(
                ResourceParam::Path("vendor_id"),
                ResourceType::Vendor,
                PolicyDomain::Vendor,
                OwnerLookup::Vendor,
            ),
        )
        .route(
            "/api/vendors/{vendor_id}/onboarding",
            get(vendors::onboarding_status_handler),
            RoutePermission::new(
                ResourceParam::Path("vendor_id"),
                ResourceType::Onboarding,
                PolicyDomain::Vendor,
                OwnerLookup::Vendor,
            ),
        )
}
