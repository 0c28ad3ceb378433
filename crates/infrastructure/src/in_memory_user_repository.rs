use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use vendorhub_application::UserRepository;
use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::UserAccount;

/// In-memory principal directory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<PrincipalId, UserAccount>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<UserAccount>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|account| account.subject == subject)
            .cloned())
    }

    async fn find_by_id(&self, user_id: PrincipalId) -> AppResult<Option<UserAccount>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn create(&self, account: UserAccount) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|existing| existing.subject == account.subject)
        {
            return Err(AppError::Conflict(format!(
                "subject '{}' is already registered",
                account.subject
            )));
        }

        users.insert(account.id, account);
        Ok(())
    }
}
