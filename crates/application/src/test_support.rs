//! In-process fakes for application service tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{
    Bundle, BundleId, Game, GameId, GrantChange, GrantKey, GrantRemoval, Owner, Package,
    PackageId, PolicyDomain, ResourceRef, Restriction, RestrictionPurge, RoleGrant, UserAccount,
    Vendor, VendorId,
};

use crate::{AuditEvent, AuditRepository, CatalogRepository, PolicyStore, UserRepository};

#[derive(Default)]
pub(crate) struct FakePolicyStore {
    grants: Mutex<BTreeMap<GrantKey, Restriction>>,
    fail: bool,
}

impl FakePolicyStore {
    pub(crate) fn failing() -> Self {
        Self {
            grants: Mutex::new(BTreeMap::new()),
            fail: true,
        }
    }

    pub(crate) async fn snapshot(&self) -> BTreeMap<GrantKey, Restriction> {
        self.grants.lock().await.clone()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("policy store unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for FakePolicyStore {
    async fn add_grant(&self, key: GrantKey, restriction: Restriction) -> AppResult<GrantChange> {
        self.check_available()?;
        let mut grants = self.grants.lock().await;
        let (merged, change) = Restriction::merge(grants.get(&key), &restriction);
        grants.insert(key, merged);
        Ok(change)
    }

    async fn remove_resources(
        &self,
        key: GrantKey,
        resources: BTreeSet<ResourceRef>,
    ) -> AppResult<GrantRemoval> {
        self.check_available()?;
        let mut grants = self.grants.lock().await;
        let current = grants
            .get(&key)
            .ok_or_else(|| AppError::NotFound("grant not found".to_owned()))?;
        match current.without(&resources)? {
            Some(remaining) => {
                grants.insert(key, remaining);
                Ok(GrantRemoval::Narrowed)
            }
            None => {
                grants.remove(&key);
                Ok(GrantRemoval::Deleted)
            }
        }
    }

    async fn remove_grant(&self, key: GrantKey) -> AppResult<()> {
        self.check_available()?;
        self.grants
            .lock()
            .await
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("grant not found".to_owned()))
    }

    async fn find_grant(&self, key: GrantKey) -> AppResult<Option<RoleGrant>> {
        self.check_available()?;
        Ok(self
            .grants
            .lock()
            .await
            .get(&key)
            .map(|restriction| RoleGrant::new(key, restriction.clone())))
    }

    async fn grants_for_user(
        &self,
        user: PrincipalId,
        domain: PolicyDomain,
    ) -> AppResult<Vec<RoleGrant>> {
        self.check_available()?;
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|(key, _)| key.user == user && key.domain == domain)
            .map(|(key, restriction)| RoleGrant::new(*key, restriction.clone()))
            .collect())
    }

    async fn grants_for_owner(
        &self,
        domain: PolicyDomain,
        owner: Owner,
    ) -> AppResult<Vec<RoleGrant>> {
        self.check_available()?;
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|(key, _)| key.owner == owner && key.domain == domain)
            .map(|(key, restriction)| RoleGrant::new(*key, restriction.clone()))
            .collect())
    }

    async fn purge_resource(
        &self,
        domain: PolicyDomain,
        owner: Owner,
        resource: &ResourceRef,
    ) -> AppResult<usize> {
        self.check_available()?;
        let mut grants = self.grants.lock().await;
        let keys: Vec<GrantKey> = grants
            .keys()
            .filter(|key| key.domain == domain && key.owner == owner)
            .copied()
            .collect();

        let mut changed = 0;
        for key in keys {
            let Some(restriction) = grants.get(&key) else {
                continue;
            };
            match restriction.purge(resource) {
                RestrictionPurge::Untouched => {}
                RestrictionPurge::Narrowed(remaining) => {
                    grants.insert(key, remaining);
                    changed += 1;
                }
                RestrictionPurge::Emptied => {
                    grants.remove(&key);
                    changed += 1;
                }
            }
        }

        Ok(changed)
    }
}

#[derive(Default)]
pub(crate) struct FakeCatalogRepository {
    vendors: Mutex<HashMap<VendorId, Vendor>>,
    games: Mutex<HashMap<GameId, Game>>,
    packages: Mutex<HashMap<PackageId, Package>>,
    bundles: Mutex<HashMap<BundleId, Bundle>>,
    pub(crate) game_lookups: AtomicUsize,
}

impl FakeCatalogRepository {
    pub(crate) fn game_lookup_count(&self) -> usize {
        self.game_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogRepository for FakeCatalogRepository {
    async fn find_vendor(&self, vendor_id: VendorId) -> AppResult<Option<Vendor>> {
        Ok(self.vendors.lock().await.get(&vendor_id).cloned())
    }

    async fn list_vendors(&self, manager: Option<PrincipalId>) -> AppResult<Vec<Vendor>> {
        Ok(self
            .vendors
            .lock()
            .await
            .values()
            .filter(|vendor| manager.is_none_or(|manager| vendor.manager == manager))
            .cloned()
            .collect())
    }

    async fn save_vendor(&self, vendor: Vendor) -> AppResult<()> {
        self.vendors.lock().await.insert(vendor.id, vendor);
        Ok(())
    }

    async fn find_game(&self, game_id: GameId) -> AppResult<Option<Game>> {
        self.game_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.games.lock().await.get(&game_id).cloned())
    }

    async fn list_games(&self, vendor_id: VendorId) -> AppResult<Vec<Game>> {
        Ok(self
            .games
            .lock()
            .await
            .values()
            .filter(|game| game.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn save_game(&self, game: Game) -> AppResult<()> {
        self.games.lock().await.insert(game.id, game);
        Ok(())
    }

    async fn delete_game(&self, game_id: GameId) -> AppResult<()> {
        self.games
            .lock()
            .await
            .remove(&game_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("game '{game_id}' not found")))
    }

    async fn find_package(&self, package_id: PackageId) -> AppResult<Option<Package>> {
        Ok(self.packages.lock().await.get(&package_id).cloned())
    }

    async fn list_packages(&self, vendor_id: VendorId) -> AppResult<Vec<Package>> {
        Ok(self
            .packages
            .lock()
            .await
            .values()
            .filter(|package| package.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn save_package(&self, package: Package) -> AppResult<()> {
        self.packages.lock().await.insert(package.id, package);
        Ok(())
    }

    async fn delete_package(&self, package_id: PackageId) -> AppResult<()> {
        self.packages
            .lock()
            .await
            .remove(&package_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("package '{package_id}' not found")))
    }

    async fn find_bundle(&self, bundle_id: BundleId) -> AppResult<Option<Bundle>> {
        Ok(self.bundles.lock().await.get(&bundle_id).cloned())
    }

    async fn list_bundles(&self, vendor_id: VendorId) -> AppResult<Vec<Bundle>> {
        Ok(self
            .bundles
            .lock()
            .await
            .values()
            .filter(|bundle| bundle.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn save_bundle(&self, bundle: Bundle) -> AppResult<()> {
        self.bundles.lock().await.insert(bundle.id, bundle);
        Ok(())
    }

    async fn delete_bundle(&self, bundle_id: BundleId) -> AppResult<()> {
        self.bundles
            .lock()
            .await
            .remove(&bundle_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("bundle '{bundle_id}' not found")))
    }
}

#[derive(Default)]
pub(crate) struct FakeUserRepository {
    users: Mutex<HashMap<PrincipalId, UserAccount>>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<UserAccount>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.subject == subject)
            .cloned())
    }

    async fn find_by_id(&self, user_id: PrincipalId) -> AppResult<Option<UserAccount>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn create(&self, account: UserAccount) -> AppResult<()> {
        let mut users = self.users.lock().await;
        if users.values().any(|user| user.subject == account.subject) {
            return Err(AppError::Conflict(format!(
                "subject '{}' is already registered",
                account.subject
            )));
        }
        users.insert(account.id, account);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
