use super::*;

pub async fn list_bundles_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<Vec<BundleResponse>>> {
    let bundles = state
        .catalog_service
        .list_bundles(parse_id(vendor_id.as_str())?)
        .await?
        .into_iter()
        .map(BundleResponse::from)
        .collect();

    Ok(Json(bundles))
}

pub async fn create_bundle_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(payload): Json<CreateBundleRequest>,
) -> ApiResult<(StatusCode, Json<BundleResponse>)> {
    let package_ids = payload
        .package_ids
        .iter()
        .map(|package_id| parse_id::<PackageId>(package_id.as_str()))
        .collect::<ApiResult<Vec<_>>>()?;

    let bundle = state
        .catalog_service
        .create_bundle(
            parse_id(vendor_id.as_str())?,
            payload.name.as_str(),
            package_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(BundleResponse::from(bundle))))
}

pub async fn get_bundle_handler(
    State(state): State<AppState>,
    Path((vendor_id, bundle_id)): Path<(String, String)>,
) -> ApiResult<Json<BundleResponse>> {
    let bundle = state
        .catalog_service
        .get_bundle(parse_id(vendor_id.as_str())?, parse_id::<BundleId>(bundle_id.as_str())?)
        .await?;

    Ok(Json(BundleResponse::from(bundle)))
}

pub async fn delete_bundle_handler(
    State(state): State<AppState>,
    Path((vendor_id, bundle_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .catalog_service
        .delete_bundle(parse_id(vendor_id.as_str())?, parse_id(bundle_id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
