use axum::routing::get;
use vendorhub_domain::{PolicyDomain, ResourceType};

use super::RouteRegistry;
use crate::handlers::catalog;
use crate::permissions::{OwnerLookup, ResourceParam, RoutePermission};

const fn vendor_collection(resource_type: ResourceType) -> RoutePermission {
    RoutePermission::new(
        ResourceParam::Path("vendor_id"),
        resource_type,
        PolicyDomain::Vendor,
        OwnerLookup::Vendor,
    )
}

pub(super) fn register(registry: RouteRegistry) -> RouteRegistry {
    registry
        .route(
            "/api/vendors/{vendor_id}/games",
            get(catalog::list_games_handler).post(catalog::create_game_handler),
            vendor_collection(ResourceType::Game),
        )
        .route(
            "/api/vendors/{vendor_id}/games/{game_id}",
            get(catalog::get_game_handler)
                .put(catalog::update_game_handler)
                .delete(catalog::delete_game_handler),
            RoutePermission::new(
                ResourceParam::Path("game_id"),
                ResourceType::Game,
                PolicyDomain::Vendor,
                OwnerLookup::Game,
            ),
        )
        .route(
            "/api/vendors/{vendor_id}/packages",
            get(catalog::list_packages_handler).post(catalog::create_package_handler),
            vendor_collection(ResourceType::Package),
        )
        .route(
            "/api/vendors/{vendor_id}/packages/{package_id}",
            get(catalog::get_package_handler).delete(catalog::delete_package_handler),
            RoutePermission::new(
                ResourceParam::Path("package_id"),
                ResourceType::Package,
                PolicyDomain::Vendor,
                OwnerLookup::Package,
            ),
        )
        .route(
            "/api/vendors/{vendor_id}/bundles",
            get(catalog::list_bundles_handler).post(catalog::create_bundle_handler),
            vendor_collection(ResourceType::Bundle),
        )
        .route(
            "/api/vendors/{vendor_id}/bundles/{bundle_id}",
            get(catalog::get_bundle_handler).delete(catalog::delete_bundle_handler),
            RoutePermission::new(
                ResourceParam::Path("bundle_id"),
                ResourceType::Bundle,
                PolicyDomain::Vendor,
                OwnerLookup::Bundle,
            ),
        )
}
