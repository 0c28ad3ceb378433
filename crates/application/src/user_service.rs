//! Principal directory: maps external identities onto internal principals.

use std::sync::Arc;

use async_trait::async_trait;

use vendorhub_core::{AppError, AppResult, PrincipalId, UserIdentity};
use vendorhub_domain::{EmailAddress, UserAccount};

/// Repository port for registered principals.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by external subject.
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<UserAccount>>;

    /// Finds a user by internal id.
    async fn find_by_id(&self, user_id: PrincipalId) -> AppResult<Option<UserAccount>>;

    /// Persists a new user. Fails with `Conflict` when the subject exists.
    async fn create(&self, account: UserAccount) -> AppResult<()>;
}

/// Application service for principal registration and lookup.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Registers the authenticated identity, returning the existing account
    /// when the subject is already known.
    pub async fn register(&self, identity: &UserIdentity) -> AppResult<UserAccount> {
        if let Some(existing) = self.repository.find_by_subject(identity.subject()).await? {
            return Ok(existing);
        }

        let email = identity.email().map(EmailAddress::new).transpose()?;
        let display_name = match identity.display_name().trim() {
            "" => default_display_name(identity),
            name => name.to_owned(),
        };

        let account = UserAccount {
            id: PrincipalId::new(),
            subject: identity.subject().to_owned(),
            display_name,
            email,
        };
        self.repository.create(account.clone()).await?;

        Ok(account)
    }

    /// Translates an external subject into its internal principal.
    pub async fn resolve_principal(&self, subject: &str) -> AppResult<PrincipalId> {
        self.repository
            .find_by_subject(subject)
            .await?
            .map(|account| account.id)
            .ok_or_else(|| {
                AppError::Unauthorized(format!("subject '{subject}' is not registered"))
            })
    }

    /// Returns a registered account by principal id.
    pub async fn find_account(&self, user_id: PrincipalId) -> AppResult<UserAccount> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    /// Returns a registered account by external subject, if any.
    pub async fn find_by_subject(&self, subject: &str) -> AppResult<Option<UserAccount>> {
        self.repository.find_by_subject(subject).await
    }
}

fn default_display_name(identity: &UserIdentity) -> String {
    identity
        .email()
        .and_then(|email| email.split('@').next())
        .filter(|local| !local.is_empty())
        .unwrap_or(identity.subject())
        .to_owned()
}
