use super::*;

pub async fn list_packages_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<Vec<PackageResponse>>> {
    let packages = state
        .catalog_service
        .list_packages(parse_id(vendor_id.as_str())?)
        .await?
        .into_iter()
        .map(PackageResponse::from)
        .collect();

    Ok(Json(packages))
}

pub async fn create_package_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(payload): Json<CreatePackageRequest>,
) -> ApiResult<(StatusCode, Json<PackageResponse>)> {
    let game_ids = payload
        .game_ids
        .iter()
        .map(|game_id| parse_id::<GameId>(game_id.as_str()))
        .collect::<ApiResult<Vec<_>>>()?;

    let package = state
        .catalog_service
        .create_package(
            parse_id(vendor_id.as_str())?,
            payload.name.as_str(),
            game_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PackageResponse::from(package))))
}

pub async fn get_package_handler(
    State(state): State<AppState>,
    Path((vendor_id, package_id)): Path<(String, String)>,
) -> ApiResult<Json<PackageResponse>> {
    let package = state
        .catalog_service
        .get_package(parse_id(vendor_id.as_str())?, parse_id(package_id.as_str())?)
        .await?;

    Ok(Json(PackageResponse::from(package)))
}

pub async fn delete_package_handler(
    State(state): State<AppState>,
    Path((vendor_id, package_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .catalog_service
        .delete_package(parse_id(vendor_id.as_str())?, parse_id(package_id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
