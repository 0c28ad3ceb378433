use serde::{Deserialize, Serialize};
use ts_rs::TS;
use vendorhub_domain::{Bundle, Game, Package, Vendor};

/// Incoming payload for vendor creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-vendor-request.ts"
)]
pub struct CreateVendorRequest {
    pub name: String,
}

/// Incoming payload for vendor updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-vendor-request.ts"
)]
pub struct UpdateVendorRequest {
    pub name: String,
}

/// API representation of a vendor.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/vendor-response.ts"
)]
pub struct VendorResponse {
    pub vendor_id: String,
    pub name: String,
    pub manager_id: String,
    pub approved: bool,
}

impl From<Vendor> for VendorResponse {
    fn from(vendor: Vendor) -> Self {
        Self {
            vendor_id: vendor.id.to_string(),
            name: vendor.name,
            manager_id: vendor.manager.to_string(),
            approved: vendor.approved,
        }
    }
}

/// Onboarding status of a vendor.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/onboarding-status-response.ts"
)]
pub struct OnboardingStatusResponse {
    pub vendor_id: String,
    pub approved: bool,
}

/// Incoming payload for game creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-game-request.ts"
)]
pub struct CreateGameRequest {
    pub name: String,
}

/// Incoming payload for game updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-game-request.ts"
)]
pub struct UpdateGameRequest {
    pub name: String,
}

/// API representation of a game.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/game-response.ts"
)]
pub struct GameResponse {
    pub game_id: String,
    pub vendor_id: String,
    pub name: String,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            game_id: game.id.to_string(),
            vendor_id: game.vendor_id.to_string(),
            name: game.name,
        }
    }
}

/// Incoming payload for package creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-package-request.ts"
)]
pub struct CreatePackageRequest {
    pub name: String,
    #[serde(default)]
    pub game_ids: Vec<String>,
}

/// API representation of a package.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/package-response.ts"
)]
pub struct PackageResponse {
    pub package_id: String,
    pub vendor_id: String,
    pub name: String,
    pub game_ids: Vec<String>,
}

impl From<Package> for PackageResponse {
    fn from(package: Package) -> Self {
        Self {
            package_id: package.id.to_string(),
            vendor_id: package.vendor_id.to_string(),
            name: package.name,
            game_ids: package.game_ids.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Incoming payload for bundle creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-bundle-request.ts"
)]
pub struct CreateBundleRequest {
    pub name: String,
    #[serde(default)]
    pub package_ids: Vec<String>,
}

/// API representation of a bundle.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bundle-response.ts"
)]
pub struct BundleResponse {
    pub bundle_id: String,
    pub vendor_id: String,
    pub name: String,
    pub package_ids: Vec<String>,
}

impl From<Bundle> for BundleResponse {
    fn from(bundle: Bundle) -> Self {
        Self {
            bundle_id: bundle.id.to_string(),
            vendor_id: bundle.vendor_id.to_string(),
            name: bundle.name,
            package_ids: bundle.package_ids.iter().map(ToString::to_string).collect(),
        }
    }
}
