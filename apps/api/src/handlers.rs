use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use vendorhub_core::{AppError, PrincipalId, UserIdentity};
use vendorhub_domain::{BundleId, GameId, PackageId, ResourceRef, Role, VendorId};

use crate::dto::{
    BundleResponse, CreateBundleRequest, CreateGameRequest, CreatePackageRequest,
    CreateVendorRequest, GameResponse, HealthResponse, MemberResponse, OnboardingStatusResponse,
    PackageResponse, PermissionsResponse, ProfileResponse, RoleMutationRequest,
    UpdateGameRequest, UpdateVendorRequest, VendorResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub mod admin;
pub mod catalog;
pub mod health;
pub mod members;
pub mod profile;
pub mod vendors;

fn parse_id<T>(value: &str) -> ApiResult<T>
where
    T: FromStr<Err = AppError>,
{
    Ok(T::from_str(value)?)
}
