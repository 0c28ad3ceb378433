use serde::Serialize;
use ts_rs::TS;
use vendorhub_domain::UserAccount;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage_backend: &'static str,
}

/// API representation of the registered principal behind a request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/profile-response.ts"
)]
pub struct ProfileResponse {
    pub user_id: String,
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
}

impl From<UserAccount> for ProfileResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            user_id: account.id.to_string(),
            subject: account.subject,
            display_name: account.display_name,
            email: account.email.map(|email| email.as_str().to_owned()),
        }
    }
}
