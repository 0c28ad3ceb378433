use async_trait::async_trait;
use vendorhub_core::{AppResult, PrincipalId};
use vendorhub_domain::{Bundle, BundleId, Game, GameId, Package, PackageId, Vendor, VendorId};

/// Repository port for catalog entities.
///
/// Only the lookups ownership resolution and metadata decoration need, plus
/// the thin write surface the HTTP API exposes.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Finds a vendor by id.
    async fn find_vendor(&self, vendor_id: VendorId) -> AppResult<Option<Vendor>>;

    /// Lists vendors, optionally narrowed to one manager.
    async fn list_vendors(&self, manager: Option<PrincipalId>) -> AppResult<Vec<Vendor>>;

    /// Inserts or updates a vendor.
    async fn save_vendor(&self, vendor: Vendor) -> AppResult<()>;

    /// Finds a game by id.
    async fn find_game(&self, game_id: GameId) -> AppResult<Option<Game>>;

    /// Lists games published by a vendor.
    async fn list_games(&self, vendor_id: VendorId) -> AppResult<Vec<Game>>;

    /// Inserts or updates a game.
    async fn save_game(&self, game: Game) -> AppResult<()>;

    /// Deletes a game and its package memberships.
    async fn delete_game(&self, game_id: GameId) -> AppResult<()>;

    /// Finds a package by id.
    async fn find_package(&self, package_id: PackageId) -> AppResult<Option<Package>>;

    /// Lists packages sold by a vendor.
    async fn list_packages(&self, vendor_id: VendorId) -> AppResult<Vec<Package>>;

    /// Inserts a package.
    async fn save_package(&self, package: Package) -> AppResult<()>;

    /// Deletes a package and its bundle memberships.
    async fn delete_package(&self, package_id: PackageId) -> AppResult<()>;

    /// Finds a bundle by id.
    async fn find_bundle(&self, bundle_id: BundleId) -> AppResult<Option<Bundle>>;

    /// Lists bundles sold by a vendor.
    async fn list_bundles(&self, vendor_id: VendorId) -> AppResult<Vec<Bundle>>;

    /// Inserts a bundle.
    async fn save_bundle(&self, bundle: Bundle) -> AppResult<()>;

    /// Deletes a bundle.
    async fn delete_bundle(&self, bundle_id: BundleId) -> AppResult<()>;
}
