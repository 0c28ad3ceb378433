use async_trait::async_trait;
use sqlx::PgPool;

use vendorhub_application::{AuditEvent, AuditRepository};
use vendorhub_core::{AppError, AppResult};

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (subject, action, resource_type, resource_id, detail)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.subject)
        .bind(event.action.as_str())
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.detail)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::migrate::Migrator;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::{PgPool, Row};
    use vendorhub_application::{AuditEvent, AuditRepository};
    use vendorhub_domain::AuditAction;

    use super::PostgresAuditRepository;

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
            panic!("failed to run migrations for postgres audit tests: {error}");
        }

        Some(pool)
    }

    #[tokio::test]
    async fn appended_events_are_stored_with_stable_action_values() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let repository = PostgresAuditRepository::new(pool.clone());
        let resource_id = format!("vendor:{}", uuid::Uuid::new_v4());

        let appended = repository
            .append_event(AuditEvent {
                subject: "auditor".to_owned(),
                action: AuditAction::VendorApproved,
                resource_type: "vendor".to_owned(),
                resource_id: resource_id.clone(),
                detail: None,
            })
            .await;
        assert!(appended.is_ok());

        let action = sqlx::query("SELECT action FROM audit_log_entries WHERE resource_id = $1")
            .bind(resource_id)
            .fetch_one(&pool)
            .await
            .map(|row| row.get::<String, _>("action"));
        assert_eq!(action.ok().as_deref(), Some("vendor.approved"));
    }
}
