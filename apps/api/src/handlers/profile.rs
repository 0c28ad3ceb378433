use tracing::info;

use super::*;

/// Registers the authenticated subject as an internal principal.
pub async fn register_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<ProfileResponse>> {
    let account = state.user_service.register(&user).await?;

    if state.super_admin_subjects.contains(account.subject.as_str())
        && state.membership_service.ensure_super_admin(account.id).await?
    {
        info!(subject = %account.subject, "granted bootstrap super admin role on registration");
    }

    Ok(Json(ProfileResponse::from(account)))
}

pub async fn get_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<ProfileResponse>> {
    let account = state
        .user_service
        .find_by_subject(user.subject())
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("subject '{}' is not registered", user.subject()))
        })?;

    Ok(Json(ProfileResponse::from(account)))
}
