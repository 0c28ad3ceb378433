use std::collections::BTreeSet;
use std::sync::Arc;

use vendorhub_application::{
    AuthorizationService, CatalogService, MembershipService, OwnershipService, UserService,
};

use crate::api_config::StorageBackend;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub ownership_service: OwnershipService,
    pub catalog_service: CatalogService,
    pub membership_service: MembershipService,
    pub user_service: UserService,
    pub storage_backend: StorageBackend,
    pub gateway_secret: Arc<str>,
    pub super_admin_subjects: Arc<BTreeSet<String>>,
}
