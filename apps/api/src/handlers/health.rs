use super::*;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage_backend: state.storage_backend.as_str(),
    })
}
