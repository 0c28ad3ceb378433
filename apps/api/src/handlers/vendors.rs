use super::*;

pub async fn list_vendors_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<PrincipalId>,
) -> ApiResult<Json<Vec<VendorResponse>>> {
    let vendors = state
        .catalog_service
        .list_managed_vendors(caller)
        .await?
        .into_iter()
        .map(VendorResponse::from)
        .collect();

    Ok(Json(vendors))
}

pub async fn create_vendor_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<PrincipalId>,
    Json(payload): Json<CreateVendorRequest>,
) -> ApiResult<(StatusCode, Json<VendorResponse>)> {
    let vendor = state
        .catalog_service
        .create_vendor(caller, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(VendorResponse::from(vendor))))
}

pub async fn get_vendor_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<VendorResponse>> {
    let vendor = state
        .catalog_service
        .get_vendor(parse_id(vendor_id.as_str())?)
        .await?;

    Ok(Json(VendorResponse::from(vendor)))
}

pub async fn update_vendor_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(payload): Json<UpdateVendorRequest>,
) -> ApiResult<Json<VendorResponse>> {
    let vendor = state
        .catalog_service
        .rename_vendor(parse_id(vendor_id.as_str())?, payload.name.as_str())
        .await?;

    Ok(Json(VendorResponse::from(vendor)))
}

pub async fn onboarding_status_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<OnboardingStatusResponse>> {
    let vendor = state
        .catalog_service
        .get_vendor(parse_id(vendor_id.as_str())?)
        .await?;

    Ok(Json(OnboardingStatusResponse {
        vendor_id: vendor.id.to_string(),
        approved: vendor.approved,
    }))
}
