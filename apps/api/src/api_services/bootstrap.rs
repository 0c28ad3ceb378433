use tracing::{info, warn};
use vendorhub_core::AppError;

use crate::state::AppState;

/// Grants `super_admin` to every configured subject that is already
/// registered. Unregistered subjects are promoted when they register.
pub async fn bootstrap_super_admins(state: &AppState) -> Result<(), AppError> {
    for subject in state.super_admin_subjects.iter() {
        let Some(account) = state.user_service.find_by_subject(subject).await? else {
            warn!(subject = %subject, "bootstrap super admin subject is not registered yet");
            continue;
        };

        if state
            .membership_service
            .ensure_super_admin(account.id)
            .await?
        {
            info!(subject = %subject, "granted bootstrap super admin role");
        }
    }

    Ok(())
}
