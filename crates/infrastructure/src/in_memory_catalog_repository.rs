use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use vendorhub_application::CatalogRepository;
use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{Bundle, BundleId, Game, GameId, Package, PackageId, Vendor, VendorId};

/// In-memory catalog repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    vendors: RwLock<HashMap<VendorId, Vendor>>,
    games: RwLock<HashMap<GameId, Game>>,
    packages: RwLock<HashMap<PackageId, Package>>,
    bundles: RwLock<HashMap<BundleId, Bundle>>,
}

impl InMemoryCatalogRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_vendor(&self, vendor_id: VendorId) -> AppResult<Option<Vendor>> {
        Ok(self.vendors.read().await.get(&vendor_id).cloned())
    }

    async fn list_vendors(&self, manager: Option<PrincipalId>) -> AppResult<Vec<Vendor>> {
        Ok(self
            .vendors
            .read()
            .await
            .values()
            .filter(|vendor| manager.is_none_or(|manager| vendor.manager == manager))
            .cloned()
            .collect())
    }

    async fn save_vendor(&self, vendor: Vendor) -> AppResult<()> {
        self.vendors.write().await.insert(vendor.id, vendor);
        Ok(())
    }

    async fn find_game(&self, game_id: GameId) -> AppResult<Option<Game>> {
        Ok(self.games.read().await.get(&game_id).cloned())
    }

    async fn list_games(&self, vendor_id: VendorId) -> AppResult<Vec<Game>> {
        Ok(self
            .games
            .read()
            .await
            .values()
            .filter(|game| game.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn save_game(&self, game: Game) -> AppResult<()> {
        if !self.vendors.read().await.contains_key(&game.vendor_id) {
            return Err(AppError::NotFound(format!(
                "vendor '{}' not found",
                game.vendor_id
            )));
        }

        self.games.write().await.insert(game.id, game);
        Ok(())
    }

    async fn delete_game(&self, game_id: GameId) -> AppResult<()> {
        if self.games.write().await.remove(&game_id).is_none() {
            return Err(AppError::NotFound(format!("game '{game_id}' not found")));
        }

        for package in self.packages.write().await.values_mut() {
            package.game_ids.retain(|included| included != &game_id);
        }

        Ok(())
    }

    async fn find_package(&self, package_id: PackageId) -> AppResult<Option<Package>> {
        Ok(self.packages.read().await.get(&package_id).cloned())
    }

    async fn list_packages(&self, vendor_id: VendorId) -> AppResult<Vec<Package>> {
        Ok(self
            .packages
            .read()
            .await
            .values()
            .filter(|package| package.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn save_package(&self, package: Package) -> AppResult<()> {
        let mut packages = self.packages.write().await;
        if packages.contains_key(&package.id) {
            return Err(AppError::Conflict(format!(
                "package '{}' already exists",
                package.id
            )));
        }

        packages.insert(package.id, package);
        Ok(())
    }

    async fn delete_package(&self, package_id: PackageId) -> AppResult<()> {
        if self.packages.write().await.remove(&package_id).is_none() {
            return Err(AppError::NotFound(format!(
                "package '{package_id}' not found"
            )));
        }

        for bundle in self.bundles.write().await.values_mut() {
            bundle.package_ids.retain(|included| included != &package_id);
        }

        Ok(())
    }

    async fn find_bundle(&self, bundle_id: BundleId) -> AppResult<Option<Bundle>> {
        Ok(self.bundles.read().await.get(&bundle_id).cloned())
    }

    async fn list_bundles(&self, vendor_id: VendorId) -> AppResult<Vec<Bundle>> {
        Ok(self
            .bundles
            .read()
            .await
            .values()
            .filter(|bundle| bundle.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn save_bundle(&self, bundle: Bundle) -> AppResult<()> {
        let mut bundles = self.bundles.write().await;
        if bundles.contains_key(&bundle.id) {
            return Err(AppError::Conflict(format!(
                "bundle '{}' already exists",
                bundle.id
            )));
        }

        bundles.insert(bundle.id, bundle);
        Ok(())
    }

    async fn delete_bundle(&self, bundle_id: BundleId) -> AppResult<()> {
        self.bundles
            .write()
            .await
            .remove(&bundle_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("bundle '{bundle_id}' not found")))
    }
}
