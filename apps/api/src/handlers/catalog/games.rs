use super::*;

pub async fn list_games_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<Vec<GameResponse>>> {
    let games = state
        .catalog_service
        .list_games(parse_id(vendor_id.as_str())?)
        .await?
        .into_iter()
        .map(GameResponse::from)
        .collect();

    Ok(Json(games))
}

pub async fn create_game_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(payload): Json<CreateGameRequest>,
) -> ApiResult<(StatusCode, Json<GameResponse>)> {
    let game = state
        .catalog_service
        .create_game(parse_id(vendor_id.as_str())?, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(GameResponse::from(game))))
}

pub async fn get_game_handler(
    State(state): State<AppState>,
    Path((vendor_id, game_id)): Path<(String, String)>,
) -> ApiResult<Json<GameResponse>> {
    let game = state
        .catalog_service
        .get_game(parse_id(vendor_id.as_str())?, parse_id(game_id.as_str())?)
        .await?;

    Ok(Json(GameResponse::from(game)))
}

pub async fn update_game_handler(
    State(state): State<AppState>,
    Path((vendor_id, game_id)): Path<(String, String)>,
    Json(payload): Json<UpdateGameRequest>,
) -> ApiResult<Json<GameResponse>> {
    let game = state
        .catalog_service
        .rename_game(
            parse_id(vendor_id.as_str())?,
            parse_id(game_id.as_str())?,
            payload.name.as_str(),
        )
        .await?;

    Ok(Json(GameResponse::from(game)))
}

pub async fn delete_game_handler(
    State(state): State<AppState>,
    Path((vendor_id, game_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .catalog_service
        .delete_game(parse_id(vendor_id.as_str())?, parse_id(game_id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
