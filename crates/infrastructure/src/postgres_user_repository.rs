//! PostgreSQL-backed principal directory.

use async_trait::async_trait;
use sqlx::PgPool;

use vendorhub_application::UserRepository;
use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{EmailAddress, UserAccount};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    subject: String,
    display_name: String,
    email: Option<String>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PrincipalId::from_uuid(row.id),
            subject: row.subject,
            display_name: row.display_name,
            email: row.email.map(EmailAddress::new).transpose()?,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, subject, display_name, email
            FROM users
            WHERE subject = $1
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by subject: {error}")))?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn find_by_id(&self, user_id: PrincipalId) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, subject, display_name, email
            FROM users
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn create(&self, account: UserAccount) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, subject, display_name, email)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.subject.as_str())
        .bind(account.display_name.as_str())
        .bind(account.email.as_ref().map(|email| email.as_str().to_owned()))
        .execute(&self.pool)
        .await
        .map_err(|error| subject_conflict_or_internal(error, account.subject.as_str()))?;

        Ok(())
    }
}

fn subject_conflict_or_internal(error: sqlx::Error, subject: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("subject '{subject}' is already registered"));
    }

    AppError::Internal(format!("failed to create user: {error}"))
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use sqlx::migrate::Migrator;
    use sqlx::postgres::PgPoolOptions;
    use vendorhub_application::UserRepository;
    use vendorhub_core::{AppError, PrincipalId};
    use vendorhub_domain::{EmailAddress, UserAccount};

    use super::PostgresUserRepository;

    static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

    async fn test_pool() -> Option<PgPool> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return None;
        };

        let pool = match PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url.as_str())
            .await
        {
            Ok(pool) => pool,
            Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
        };

        if let Err(error) = MIGRATOR.run(&pool).await {
            panic!("failed to run migrations for postgres user tests: {error}");
        }

        Some(pool)
    }

    #[tokio::test]
    async fn create_then_find_by_subject_and_id() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let repository = PostgresUserRepository::new(pool);
        let account = UserAccount {
            id: PrincipalId::new(),
            subject: format!("test|{}", PrincipalId::new()),
            display_name: "Dana".to_owned(),
            email: EmailAddress::new("dana@example.com").ok(),
        };

        assert!(repository.create(account.clone()).await.is_ok());
        let by_subject = repository.find_by_subject(account.subject.as_str()).await;
        let by_id = repository.find_by_id(account.id).await;

        assert_eq!(by_subject.ok().flatten(), Some(account.clone()));
        assert_eq!(by_id.ok().flatten(), Some(account.clone()));

        let duplicate = repository
            .create(UserAccount {
                id: PrincipalId::new(),
                ..account
            })
            .await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }
}
