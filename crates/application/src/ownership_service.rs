//! Ownership resolution along each resource family's chain.
//!
//! Vendors are owned by their manager. Games, packages and bundles are owned
//! by the manager of the vendor they belong to. Every lookup reads current
//! state; nothing here is cached.

use std::str::FromStr;
use std::sync::Arc;

use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{
    Bundle, BundleId, Game, GameId, Package, PackageId, ResourceType, Vendor, VendorId,
};

use crate::CatalogRepository;

/// Result of walking an ownership chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    /// Canonical form of the resolved resource id.
    pub resource_id: String,
    /// Vendor at the end of the chain.
    pub vendor_id: VendorId,
    /// Principal managing that vendor.
    pub owner: PrincipalId,
}

/// Application service resolving resource owners.
#[derive(Clone)]
pub struct OwnershipService {
    catalog: Arc<dyn CatalogRepository>,
}

impl OwnershipService {
    /// Creates a new service over the catalog repository.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Returns the principal owning a resource.
    ///
    /// Fails with `Validation` for a malformed id and `NotFound` when any
    /// link of the chain is missing.
    pub async fn resolve_owner(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> AppResult<PrincipalId> {
        Ok(self.resolve(resource_type, resource_id).await?.owner)
    }

    /// Walks the ownership chain of a resource.
    ///
    /// Membership and onboarding resources are addressed by vendor id.
    pub async fn resolve(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> AppResult<Ownership> {
        match resource_type {
            ResourceType::Vendor | ResourceType::Membership | ResourceType::Onboarding => {
                let vendor = self.require_vendor(VendorId::from_str(resource_id)?).await?;
                Ok(Ownership {
                    resource_id: vendor.id.to_string(),
                    vendor_id: vendor.id,
                    owner: vendor.manager,
                })
            }
            ResourceType::Game => {
                let game = self.require_game(GameId::from_str(resource_id)?).await?;
                self.through_vendor(game.id.to_string(), game.vendor_id, "game")
                    .await
            }
            ResourceType::Package => {
                let package = self
                    .require_package(PackageId::from_str(resource_id)?)
                    .await?;
                self.through_vendor(package.id.to_string(), package.vendor_id, "package")
                    .await
            }
            ResourceType::Bundle => {
                let bundle = self.require_bundle(BundleId::from_str(resource_id)?).await?;
                self.through_vendor(bundle.id.to_string(), bundle.vendor_id, "bundle")
                    .await
            }
        }
    }

    /// Loads a vendor or fails with `NotFound`.
    pub async fn require_vendor(&self, vendor_id: VendorId) -> AppResult<Vendor> {
        self.catalog
            .find_vendor(vendor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vendor '{vendor_id}' not found")))
    }

    /// Loads a game or fails with `NotFound`.
    pub async fn require_game(&self, game_id: GameId) -> AppResult<Game> {
        self.catalog
            .find_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("game '{game_id}' not found")))
    }

    /// Loads a package or fails with `NotFound`.
    pub async fn require_package(&self, package_id: PackageId) -> AppResult<Package> {
        self.catalog
            .find_package(package_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("package '{package_id}' not found")))
    }

    /// Loads a bundle or fails with `NotFound`.
    pub async fn require_bundle(&self, bundle_id: BundleId) -> AppResult<Bundle> {
        self.catalog
            .find_bundle(bundle_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("bundle '{bundle_id}' not found")))
    }

    async fn through_vendor(
        &self,
        resource_id: String,
        vendor_id: VendorId,
        family: &str,
    ) -> AppResult<Ownership> {
        let vendor = self.catalog.find_vendor(vendor_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "vendor '{vendor_id}' of {family} '{resource_id}' not found"
            ))
        })?;

        Ok(Ownership {
            resource_id,
            vendor_id: vendor.id,
            owner: vendor.manager,
        })
    }
}

/// Parses a raw resource id and returns its canonical form.
///
/// Membership and onboarding resources are addressed by vendor id.
pub fn canonical_resource_id(resource_type: ResourceType, raw_id: &str) -> AppResult<String> {
    Ok(match resource_type {
        ResourceType::Vendor | ResourceType::Membership | ResourceType::Onboarding => {
            VendorId::from_str(raw_id)?.to_string()
        }
        ResourceType::Game => GameId::from_str(raw_id)?.to_string(),
        ResourceType::Package => PackageId::from_str(raw_id)?.to_string(),
        ResourceType::Bundle => BundleId::from_str(raw_id)?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vendorhub_core::{AppError, PrincipalId};
    use vendorhub_domain::{Game, GameId, Package, PackageId, ResourceType, Vendor, VendorId};

    use crate::CatalogRepository;
    use crate::test_support::FakeCatalogRepository;

    use super::{OwnershipService, canonical_resource_id};

    async fn seeded() -> (Arc<FakeCatalogRepository>, Vendor, Game) {
        let catalog = Arc::new(FakeCatalogRepository::default());
        let vendor = Vendor {
            id: VendorId::new(),
            name: "Acme".to_owned(),
            manager: PrincipalId::new(),
            approved: true,
        };
        let game = Game {
            id: GameId::new(),
            vendor_id: vendor.id,
            name: "Space Race".to_owned(),
        };
        assert!(catalog.save_vendor(vendor.clone()).await.is_ok());
        assert!(catalog.save_game(game.clone()).await.is_ok());
        (catalog, vendor, game)
    }

    #[tokio::test]
    async fn vendor_resolves_to_manager() {
        let (catalog, vendor, _) = seeded().await;
        let service = OwnershipService::new(catalog);

        let owner = service
            .resolve_owner(ResourceType::Vendor, vendor.id.to_string().as_str())
            .await;
        assert_eq!(owner.ok(), Some(vendor.manager));
    }

    #[tokio::test]
    async fn game_resolves_through_vendor() {
        let (catalog, vendor, game) = seeded().await;
        let service = OwnershipService::new(catalog);

        let ownership = service
            .resolve(ResourceType::Game, game.id.to_string().to_uppercase().as_str())
            .await;
        let Ok(ownership) = ownership else {
            panic!("ownership resolution failed");
        };
        assert_eq!(ownership.owner, vendor.manager);
        assert_eq!(ownership.vendor_id, vendor.id);
        assert_eq!(ownership.resource_id, game.id.to_string());
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let (catalog, _, _) = seeded().await;
        let service = OwnershipService::new(catalog);

        let result = service.resolve_owner(ResourceType::Game, "game-1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_game_and_missing_vendor_are_distinct() {
        let (catalog, _, _) = seeded().await;
        let orphan = Package {
            id: PackageId::new(),
            vendor_id: VendorId::new(),
            name: "Orphan".to_owned(),
            game_ids: Vec::new(),
        };
        assert!(catalog.save_package(orphan.clone()).await.is_ok());
        let service = OwnershipService::new(catalog);

        let missing_game = service
            .resolve_owner(ResourceType::Game, GameId::new().to_string().as_str())
            .await;
        let missing_vendor = service
            .resolve_owner(ResourceType::Package, orphan.id.to_string().as_str())
            .await;

        match (missing_game, missing_vendor) {
            (Err(AppError::NotFound(game_message)), Err(AppError::NotFound(vendor_message))) => {
                assert!(game_message.starts_with("game"));
                assert!(vendor_message.starts_with("vendor"));
            }
            other => panic!("unexpected results: {other:?}"),
        }
    }

    #[test]
    fn canonical_ids_are_lowercase_hyphenated() {
        let game_id = GameId::new();
        let canonical = canonical_resource_id(
            ResourceType::Game,
            game_id.as_uuid().simple().to_string().to_uppercase().as_str(),
        );
        assert_eq!(canonical.ok(), Some(game_id.to_string()));
        assert!(matches!(
            canonical_resource_id(ResourceType::Bundle, "bundle-1"),
            Err(AppError::Validation(_))
        ));
    }
}
