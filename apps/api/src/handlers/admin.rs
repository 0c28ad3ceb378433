use super::*;

pub async fn list_all_vendors_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<VendorResponse>>> {
    let vendors = state
        .catalog_service
        .list_all_vendors()
        .await?
        .into_iter()
        .map(VendorResponse::from)
        .collect();

    Ok(Json(vendors))
}

pub async fn approve_vendor_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<VendorResponse>> {
    let vendor = state
        .catalog_service
        .approve_vendor(&user, parse_id(vendor_id.as_str())?)
        .await?;

    Ok(Json(VendorResponse::from(vendor)))
}
