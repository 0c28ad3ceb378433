//! PostgreSQL-backed catalog repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vendorhub_application::CatalogRepository;
use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{Bundle, BundleId, Game, GameId, Package, PackageId, Vendor, VendorId};

/// PostgreSQL implementation of the catalog repository port.
#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct VendorRow {
    id: uuid::Uuid,
    name: String,
    manager_id: uuid::Uuid,
    approved: bool,
}

impl From<VendorRow> for Vendor {
    fn from(row: VendorRow) -> Self {
        Self {
            id: VendorId::from_uuid(row.id),
            name: row.name,
            manager: PrincipalId::from_uuid(row.manager_id),
            approved: row.approved,
        }
    }
}

#[derive(Debug, FromRow)]
struct GameRow {
    id: uuid::Uuid,
    vendor_id: uuid::Uuid,
    name: String,
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        Self {
            id: GameId::from_uuid(row.id),
            vendor_id: VendorId::from_uuid(row.vendor_id),
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
struct PackageRow {
    id: uuid::Uuid,
    vendor_id: uuid::Uuid,
    name: String,
    member_ids: Vec<uuid::Uuid>,
}

impl From<PackageRow> for Package {
    fn from(row: PackageRow) -> Self {
        Self {
            id: PackageId::from_uuid(row.id),
            vendor_id: VendorId::from_uuid(row.vendor_id),
            name: row.name,
            game_ids: row.member_ids.into_iter().map(GameId::from_uuid).collect(),
        }
    }
}

#[derive(Debug, FromRow)]
struct BundleRow {
    id: uuid::Uuid,
    vendor_id: uuid::Uuid,
    name: String,
    member_ids: Vec<uuid::Uuid>,
}

impl From<BundleRow> for Bundle {
    fn from(row: BundleRow) -> Self {
        Self {
            id: BundleId::from_uuid(row.id),
            vendor_id: VendorId::from_uuid(row.vendor_id),
            name: row.name,
            package_ids: row
                .member_ids
                .into_iter()
                .map(PackageId::from_uuid)
                .collect(),
        }
    }
}

mod compositions;
mod vendors;

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn find_vendor(&self, vendor_id: VendorId) -> AppResult<Option<Vendor>> {
        self.find_vendor_impl(vendor_id).await
    }

    async fn list_vendors(&self, manager: Option<PrincipalId>) -> AppResult<Vec<Vendor>> {
        self.list_vendors_impl(manager).await
    }

    async fn save_vendor(&self, vendor: Vendor) -> AppResult<()> {
        self.save_vendor_impl(vendor).await
    }

    async fn find_game(&self, game_id: GameId) -> AppResult<Option<Game>> {
        self.find_game_impl(game_id).await
    }

    async fn list_games(&self, vendor_id: VendorId) -> AppResult<Vec<Game>> {
        self.list_games_impl(vendor_id).await
    }

    async fn save_game(&self, game: Game) -> AppResult<()> {
        self.save_game_impl(game).await
    }

    async fn delete_game(&self, game_id: GameId) -> AppResult<()> {
        self.delete_row("games", game_id.as_uuid(), "game").await
    }

    async fn find_package(&self, package_id: PackageId) -> AppResult<Option<Package>> {
        self.find_package_impl(package_id).await
    }

    async fn list_packages(&self, vendor_id: VendorId) -> AppResult<Vec<Package>> {
        self.list_packages_impl(vendor_id).await
    }

    async fn save_package(&self, package: Package) -> AppResult<()> {
        self.save_package_impl(package).await
    }

    async fn delete_package(&self, package_id: PackageId) -> AppResult<()> {
        self.delete_row("packages", package_id.as_uuid(), "package")
            .await
    }

    async fn find_bundle(&self, bundle_id: BundleId) -> AppResult<Option<Bundle>> {
        self.find_bundle_impl(bundle_id).await
    }

    async fn list_bundles(&self, vendor_id: VendorId) -> AppResult<Vec<Bundle>> {
        self.list_bundles_impl(vendor_id).await
    }

    async fn save_bundle(&self, bundle: Bundle) -> AppResult<()> {
        self.save_bundle_impl(bundle).await
    }

    async fn delete_bundle(&self, bundle_id: BundleId) -> AppResult<()> {
        self.delete_row("bundles", bundle_id.as_uuid(), "bundle")
            .await
    }
}

impl PostgresCatalogRepository {
    async fn delete_row(&self, table: &str, id: uuid::Uuid, label: &str) -> AppResult<()> {
        let result = sqlx::query(format!("DELETE FROM {table} WHERE id = $1").as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete {label}: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{label} '{id}' not found")));
        }

        Ok(())
    }
}

fn foreign_key_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error {
        match database_error.code().as_deref() {
            Some("23503") => {
                return AppError::NotFound(format!(
                    "failed to {operation}: referenced record does not exist"
                ));
            }
            Some("23505") => {
                return AppError::Conflict(format!("failed to {operation}: record already exists"));
            }
            _ => {}
        }
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

#[cfg(test)]
mod tests;
