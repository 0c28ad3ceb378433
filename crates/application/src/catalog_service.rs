//! Thin catalog use cases: vendors and the games, packages and bundles they
//! publish.

use std::collections::BTreeSet;
use std::sync::Arc;

use vendorhub_core::{AppError, AppResult, NonEmptyString, PrincipalId, UserIdentity};
use vendorhub_domain::{
    AuditAction, Bundle, BundleId, Game, GameId, Owner, Package, PackageId, PolicyDomain,
    ResourceRef, ResourceType, Role, RoleGrant, Vendor, VendorId,
};

use crate::{AuditEvent, AuditRepository, CatalogRepository, OwnershipService, PolicyStore};

/// Application service for catalog plumbing.
///
/// Every method assumes the route-level permission check already passed.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    ownership: OwnershipService,
    policy_store: Arc<dyn PolicyStore>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl CatalogService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        policy_store: Arc<dyn PolicyStore>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            ownership: OwnershipService::new(catalog.clone()),
            catalog,
            policy_store,
            audit_repository,
        }
    }

    /// Creates a vendor managed by the caller. New vendors start unapproved.
    pub async fn create_vendor(&self, manager: PrincipalId, name: &str) -> AppResult<Vendor> {
        let vendor = Vendor {
            id: VendorId::new(),
            name: NonEmptyString::new(name)?.into(),
            manager,
            approved: false,
        };
        self.catalog.save_vendor(vendor.clone()).await?;

        Ok(vendor)
    }

    /// Lists vendors managed by one principal.
    pub async fn list_managed_vendors(&self, manager: PrincipalId) -> AppResult<Vec<Vendor>> {
        let mut vendors = self.catalog.list_vendors(Some(manager)).await?;
        vendors.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(vendors)
    }

    /// Lists every vendor.
    pub async fn list_all_vendors(&self) -> AppResult<Vec<Vendor>> {
        let mut vendors = self.catalog.list_vendors(None).await?;
        vendors.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(vendors)
    }

    /// Returns one vendor.
    pub async fn get_vendor(&self, vendor_id: VendorId) -> AppResult<Vendor> {
        self.ownership.require_vendor(vendor_id).await
    }

    /// Renames a vendor.
    pub async fn rename_vendor(&self, vendor_id: VendorId, name: &str) -> AppResult<Vendor> {
        let name: String = NonEmptyString::new(name)?.into();
        let mut vendor = self.ownership.require_vendor(vendor_id).await?;
        vendor.name = name;
        self.catalog.save_vendor(vendor.clone()).await?;

        Ok(vendor)
    }

    /// Marks a vendor's onboarding as approved and lifts every `not_approved`
    /// grant scoped to it. Approving twice is a no-op.
    pub async fn approve_vendor(&self, actor: &UserIdentity, vendor_id: VendorId) -> AppResult<Vendor> {
        let mut vendor = self.ownership.require_vendor(vendor_id).await?;
        let gated: Vec<RoleGrant> = self
            .policy_store
            .grants_for_owner(PolicyDomain::Vendor, Owner::Principal(vendor.manager))
            .await?
            .into_iter()
            .filter(|grant| grant.role == Role::NotApproved)
            .collect();
        if vendor.approved && gated.is_empty() {
            return Ok(vendor);
        }

        if !vendor.approved {
            vendor.approved = true;
            self.catalog.save_vendor(vendor.clone()).await?;

            self.audit_repository
                .append_event(AuditEvent {
                    subject: actor.subject().to_owned(),
                    action: AuditAction::VendorApproved,
                    resource_type: ResourceType::Vendor.as_str().to_owned(),
                    resource_id: vendor.id.to_string(),
                    detail: Some(format!("approved vendor '{}'", vendor.name)),
                })
                .await?;
        }

        for grant in gated {
            self.policy_store.remove_grant(grant.key()).await?;
            self.audit_repository
                .append_event(AuditEvent {
                    subject: actor.subject().to_owned(),
                    action: AuditAction::SecurityRoleRevoked,
                    resource_type: "vendor_membership".to_owned(),
                    resource_id: format!("{}:{}", vendor.id, grant.user),
                    detail: Some(format!(
                        "lifted role '{}' from '{}' on vendor approval",
                        Role::NotApproved.as_str(),
                        grant.user
                    )),
                })
                .await?;
        }

        Ok(vendor)
    }

    /// Creates a game under a vendor.
    pub async fn create_game(&self, vendor_id: VendorId, name: &str) -> AppResult<Game> {
        let name: String = NonEmptyString::new(name)?.into();
        let vendor = self.ownership.require_vendor(vendor_id).await?;
        let game = Game {
            id: GameId::new(),
            vendor_id: vendor.id,
            name,
        };
        self.catalog.save_game(game.clone()).await?;

        Ok(game)
    }

    /// Lists the games of a vendor.
    pub async fn list_games(&self, vendor_id: VendorId) -> AppResult<Vec<Game>> {
        let vendor = self.ownership.require_vendor(vendor_id).await?;
        let mut games = self.catalog.list_games(vendor.id).await?;
        games.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(games)
    }

    /// Returns one game of a vendor.
    pub async fn get_game(&self, vendor_id: VendorId, game_id: GameId) -> AppResult<Game> {
        let game = self.ownership.require_game(game_id).await?;
        belongs_to(vendor_id, game.vendor_id, ResourceType::Game, game_id)?;
        Ok(game)
    }

    /// Renames a game.
    pub async fn rename_game(
        &self,
        vendor_id: VendorId,
        game_id: GameId,
        name: &str,
    ) -> AppResult<Game> {
        let name: String = NonEmptyString::new(name)?.into();
        let mut game = self.get_game(vendor_id, game_id).await?;
        game.name = name;
        self.catalog.save_game(game.clone()).await?;

        Ok(game)
    }

    /// Deletes a game and drops it from every grant restricted to it.
    pub async fn delete_game(&self, vendor_id: VendorId, game_id: GameId) -> AppResult<()> {
        let game = self.get_game(vendor_id, game_id).await?;
        self.catalog.delete_game(game.id).await?;
        self.purge_grants(
            game.vendor_id,
            ResourceRef::new(ResourceType::Game, game.id.to_string()),
        )
        .await
    }

    /// Creates a package of the vendor's games.
    pub async fn create_package(
        &self,
        vendor_id: VendorId,
        name: &str,
        game_ids: Vec<GameId>,
    ) -> AppResult<Package> {
        let name: String = NonEmptyString::new(name)?.into();
        let vendor = self.ownership.require_vendor(vendor_id).await?;

        let game_ids: BTreeSet<GameId> = game_ids.into_iter().collect();
        for game_id in &game_ids {
            self.get_game(vendor.id, *game_id).await?;
        }

        let package = Package {
            id: PackageId::new(),
            vendor_id: vendor.id,
            name,
            game_ids: game_ids.into_iter().collect(),
        };
        self.catalog.save_package(package.clone()).await?;

        Ok(package)
    }

    /// Lists the packages of a vendor.
    pub async fn list_packages(&self, vendor_id: VendorId) -> AppResult<Vec<Package>> {
        let vendor = self.ownership.require_vendor(vendor_id).await?;
        let mut packages = self.catalog.list_packages(vendor.id).await?;
        packages.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(packages)
    }

    /// Returns one package of a vendor.
    pub async fn get_package(&self, vendor_id: VendorId, package_id: PackageId) -> AppResult<Package> {
        let package = self.ownership.require_package(package_id).await?;
        belongs_to(vendor_id, package.vendor_id, ResourceType::Package, package_id)?;
        Ok(package)
    }

    /// Deletes a package and drops it from every grant restricted to it.
    pub async fn delete_package(&self, vendor_id: VendorId, package_id: PackageId) -> AppResult<()> {
        let package = self.get_package(vendor_id, package_id).await?;
        self.catalog.delete_package(package.id).await?;
        self.purge_grants(
            package.vendor_id,
            ResourceRef::new(ResourceType::Package, package.id.to_string()),
        )
        .await
    }

    /// Creates a bundle of the vendor's packages.
    pub async fn create_bundle(
        &self,
        vendor_id: VendorId,
        name: &str,
        package_ids: Vec<PackageId>,
    ) -> AppResult<Bundle> {
        let name: String = NonEmptyString::new(name)?.into();
        let vendor = self.ownership.require_vendor(vendor_id).await?;

        let package_ids: BTreeSet<PackageId> = package_ids.into_iter().collect();
        for package_id in &package_ids {
            self.get_package(vendor.id, *package_id).await?;
        }

        let bundle = Bundle {
            id: BundleId::new(),
            vendor_id: vendor.id,
            name,
            package_ids: package_ids.into_iter().collect(),
        };
        self.catalog.save_bundle(bundle.clone()).await?;

        Ok(bundle)
    }

    /// Lists the bundles of a vendor.
    pub async fn list_bundles(&self, vendor_id: VendorId) -> AppResult<Vec<Bundle>> {
        let vendor = self.ownership.require_vendor(vendor_id).await?;
        let mut bundles = self.catalog.list_bundles(vendor.id).await?;
        bundles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(bundles)
    }

    /// Returns one bundle of a vendor.
    pub async fn get_bundle(&self, vendor_id: VendorId, bundle_id: BundleId) -> AppResult<Bundle> {
        let bundle = self.ownership.require_bundle(bundle_id).await?;
        belongs_to(vendor_id, bundle.vendor_id, ResourceType::Bundle, bundle_id)?;
        Ok(bundle)
    }

    /// Deletes a bundle and drops it from every grant restricted to it.
    pub async fn delete_bundle(&self, vendor_id: VendorId, bundle_id: BundleId) -> AppResult<()> {
        let bundle = self.get_bundle(vendor_id, bundle_id).await?;
        self.catalog.delete_bundle(bundle.id).await?;
        self.purge_grants(
            bundle.vendor_id,
            ResourceRef::new(ResourceType::Bundle, bundle.id.to_string()),
        )
        .await
    }

    async fn purge_grants(&self, vendor_id: VendorId, resource: ResourceRef) -> AppResult<()> {
        let vendor = self.ownership.require_vendor(vendor_id).await?;
        self.policy_store
            .purge_resource(
                PolicyDomain::Vendor,
                Owner::Principal(vendor.manager),
                &resource,
            )
            .await
            .map(|_| ())
    }
}

fn belongs_to(
    expected: VendorId,
    actual: VendorId,
    resource_type: ResourceType,
    resource_id: impl std::fmt::Display,
) -> AppResult<()> {
    if expected == actual {
        return Ok(());
    }

    Err(AppError::NotFound(format!(
        "{} '{resource_id}' not found under vendor '{expected}'",
        resource_type.as_str()
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vendorhub_core::{AppError, PrincipalId, UserIdentity};
    use vendorhub_domain::{
        GameId, GrantKey, Owner, PolicyDomain, ResourceRef, ResourceType, Restriction, Role,
    };

    use crate::PolicyStore;
    use crate::test_support::{FakeAuditRepository, FakeCatalogRepository, FakePolicyStore};

    use super::CatalogService;

    fn service() -> (CatalogService, Arc<FakePolicyStore>, Arc<FakeAuditRepository>) {
        let store = Arc::new(FakePolicyStore::default());
        let audit = Arc::new(FakeAuditRepository::default());
        let service = CatalogService::new(
            Arc::new(FakeCatalogRepository::default()),
            store.clone(),
            audit.clone(),
        );
        (service, store, audit)
    }

    #[tokio::test]
    async fn vendor_names_must_not_be_blank() {
        let (service, _, _) = service();
        let result = service.create_vendor(PrincipalId::new(), "   ").await;
        assert!(matches!(result, Err(AppError::Unprocessable(_))));
    }

    #[tokio::test]
    async fn games_are_scoped_to_their_vendor() {
        let (service, _, _) = service();
        let manager = PrincipalId::new();
        let (Ok(first), Ok(second)) = (
            service.create_vendor(manager, "First").await,
            service.create_vendor(manager, "Second").await,
        ) else {
            panic!("vendor creation failed");
        };
        let Ok(game) = service.create_game(first.id, "Space Race").await else {
            panic!("game creation failed");
        };

        assert!(service.get_game(first.id, game.id).await.is_ok());
        assert!(matches!(
            service.get_game(second.id, game.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.create_package(second.id, "Starter", vec![game.id]).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_a_game_purges_restricted_grants() {
        let (service, store, _) = service();
        let manager = PrincipalId::new();
        let Ok(vendor) = service.create_vendor(manager, "Acme").await else {
            panic!("vendor creation failed");
        };
        let (Ok(kept), Ok(deleted)) = (
            service.create_game(vendor.id, "Kept").await,
            service.create_game(vendor.id, "Deleted").await,
        ) else {
            panic!("game creation failed");
        };

        let member = PrincipalId::new();
        let key = |role| GrantKey {
            role,
            user: member,
            domain: PolicyDomain::Vendor,
            owner: Owner::Principal(manager),
        };
        let game = |game_id: GameId| ResourceRef::new(ResourceType::Game, game_id.to_string());
        assert!(
            store
                .add_grant(
                    key(Role::Support),
                    Restriction::restricted([game(kept.id), game(deleted.id)])
                )
                .await
                .is_ok()
        );
        assert!(
            store
                .add_grant(key(Role::Viewer), Restriction::restricted([game(deleted.id)]))
                .await
                .is_ok()
        );

        assert!(service.delete_game(vendor.id, deleted.id).await.is_ok());

        let grants = store.snapshot().await;
        assert_eq!(
            grants.get(&key(Role::Support)),
            Some(&Restriction::restricted([game(kept.id)]))
        );
        assert!(!grants.contains_key(&key(Role::Viewer)));
    }

    #[tokio::test]
    async fn approval_is_audited_once() {
        let (service, _, audit) = service();
        let actor = UserIdentity::new("operator", "Operator", None);
        let Ok(vendor) = service.create_vendor(PrincipalId::new(), "Acme").await else {
            panic!("vendor creation failed");
        };
        assert!(!vendor.approved);

        let first = service.approve_vendor(&actor, vendor.id).await;
        let second = service.approve_vendor(&actor, vendor.id).await;

        assert!(first.is_ok_and(|vendor| vendor.approved));
        assert!(second.is_ok());
        assert_eq!(audit.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn approval_lifts_not_approved_grants() {
        let (service, store, audit) = service();
        let actor = UserIdentity::new("operator", "Operator", None);
        let manager = PrincipalId::new();
        let Ok(vendor) = service.create_vendor(manager, "Acme").await else {
            panic!("vendor creation failed");
        };

        let member = PrincipalId::new();
        let key = |role| GrantKey {
            role,
            user: member,
            domain: PolicyDomain::Vendor,
            owner: Owner::Principal(manager),
        };
        for role in [Role::Viewer, Role::NotApproved] {
            assert!(
                store
                    .add_grant(key(role), Restriction::Wildcard)
                    .await
                    .is_ok()
            );
        }

        assert!(service.approve_vendor(&actor, vendor.id).await.is_ok());

        let grants = store.snapshot().await;
        assert!(grants.contains_key(&key(Role::Viewer)));
        assert!(!grants.contains_key(&key(Role::NotApproved)));
        assert_eq!(audit.events.lock().await.len(), 2);

        assert!(
            store
                .add_grant(key(Role::NotApproved), Restriction::Wildcard)
                .await
                .is_ok()
        );
        assert!(service.approve_vendor(&actor, vendor.id).await.is_ok());
        assert!(!store.snapshot().await.contains_key(&key(Role::NotApproved)));
    }
}
