mod catalog;
mod common;
mod membership;

pub use catalog::{
    BundleResponse, CreateBundleRequest, CreateGameRequest, CreatePackageRequest,
    CreateVendorRequest, GameResponse, OnboardingStatusResponse, PackageResponse,
    UpdateGameRequest, UpdateVendorRequest, VendorResponse,
};
pub use common::{HealthResponse, ProfileResponse};
pub use membership::{
    MemberResponse, PermissionsResponse, ResourceRefPayload, RoleMutationRequest,
};
