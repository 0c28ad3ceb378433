use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, get};
use tower_http::trace::TraceLayer;
use vendorhub_core::AppError;

use crate::handlers;
use crate::middleware::{self, PermissionGate};
use crate::permissions::{RoutePermission, RoutePermissionTable};
use crate::state::AppState;

mod admin;
mod catalog;
mod cors;
mod members;
mod vendors;


/// Collects permission-gated routes together with their table entries.
#[derive(Default)]
pub(crate) struct RouteRegistry {
    router: Router<AppState>,
    table: RoutePermissionTable,
}

impl RouteRegistry {
    pub(crate) fn route(
        mut self,
        path: &'static str,
        method_router: MethodRouter<AppState>,
        permission: RoutePermission,
    ) -> Self {
        self.router = self.router.route(path, method_router);
        self.table.insert(path, permission);
        self
    }

    fn into_gated_router(self, app_state: &AppState) -> Router<AppState> {
        let gate = PermissionGate {
            state: app_state.clone(),
            table: Arc::new(self.table),
        };

        self.router
            .route_layer(from_fn_with_state(gate, middleware::require_route_permission))
    }
}

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let registry = RouteRegistry::default();
    let registry = vendors::register(registry);
    let registry = catalog::register(registry);
    let registry = members::register(registry);
    let registry = admin::register(registry);

    let authenticated_routes = registry
        .into_gated_router(&app_state)
        .route(
            "/api/profile",
            get(handlers::profile::get_profile_handler)
                .post(handlers::profile::register_profile_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
