//! PostgreSQL-backed role grant store.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use vendorhub_application::PolicyStore;
use vendorhub_core::{AppError, AppResult, PrincipalId};
use vendorhub_domain::{
    GrantChange, GrantKey, GrantRemoval, Owner, PolicyDomain, ResourceRef, Restriction,
    RestrictionPurge, Role, RoleGrant,
};

/// PostgreSQL implementation of the policy store port.
///
/// Every mutation runs in one transaction that locks the affected grant rows.
#[derive(Clone)]
pub struct PostgresPolicyStore {
    pool: PgPool,
}

impl PostgresPolicyStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleGrantRow {
    role: String,
    user_id: uuid::Uuid,
    domain: String,
    owner: String,
    wildcard: bool,
    restricted_resources: Value,
}

impl TryFrom<RoleGrantRow> for RoleGrant {
    type Error = AppError;

    fn try_from(row: RoleGrantRow) -> Result<Self, Self::Error> {
        let key = GrantKey {
            role: Role::from_str(row.role.as_str())?,
            user: PrincipalId::from_uuid(row.user_id),
            domain: PolicyDomain::from_str(row.domain.as_str())?,
            owner: Owner::from_str(row.owner.as_str())?,
        };

        Ok(RoleGrant::new(
            key,
            restriction_from_columns(row.wildcard, row.restricted_resources)?,
        ))
    }
}

fn restriction_from_columns(wildcard: bool, restricted_resources: Value) -> AppResult<Restriction> {
    if wildcard {
        return Ok(Restriction::Wildcard);
    }

    let resources: BTreeSet<ResourceRef> = serde_json::from_value(restricted_resources)
        .map_err(|error| {
            AppError::Internal(format!("failed to decode grant restriction set: {error}"))
        })?;
    if resources.is_empty() {
        return Err(AppError::Internal(
            "stored restricted grant has no resources".to_owned(),
        ));
    }

    Ok(Restriction::Resources(resources))
}

fn restriction_columns(restriction: &Restriction) -> AppResult<(bool, Value)> {
    match restriction {
        Restriction::Wildcard => Ok((true, Value::Array(Vec::new()))),
        Restriction::Resources(resources) => serde_json::to_value(resources)
            .map(|value| (false, value))
            .map_err(|error| {
                AppError::Internal(format!("failed to encode grant restriction set: {error}"))
            }),
    }
}

fn grant_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(
            "grant was changed by a concurrent request; retry the request".to_owned(),
        );
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

const SELECT_GRANT_COLUMNS: &str = r#"
    SELECT role, user_id, domain, owner, wildcard, restricted_resources
    FROM role_grants
"#;

impl PostgresPolicyStore {
    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }

    async fn lock_grant(
        transaction: &mut Transaction<'static, Postgres>,
        key: &GrantKey,
    ) -> AppResult<Option<Restriction>> {
        let row = sqlx::query_as::<_, RoleGrantRow>(
            format!(
                "{SELECT_GRANT_COLUMNS} WHERE role = $1 AND user_id = $2 AND domain = $3 AND owner = $4 FOR UPDATE"
            )
            .as_str(),
        )
        .bind(key.role.as_str())
        .bind(key.user.as_uuid())
        .bind(key.domain.as_str())
        .bind(key.owner.to_string())
        .fetch_optional(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role grant: {error}")))?;

        row.map(|row| restriction_from_columns(row.wildcard, row.restricted_resources))
            .transpose()
    }

    async fn write_restriction(
        transaction: &mut Transaction<'static, Postgres>,
        key: &GrantKey,
        restriction: &Restriction,
    ) -> AppResult<()> {
        let (wildcard, restricted_resources) = restriction_columns(restriction)?;
        sqlx::query(
            r#"
            UPDATE role_grants
            SET wildcard = $5, restricted_resources = $6, updated_at = now()
            WHERE role = $1 AND user_id = $2 AND domain = $3 AND owner = $4
            "#,
        )
        .bind(key.role.as_str())
        .bind(key.user.as_uuid())
        .bind(key.domain.as_str())
        .bind(key.owner.to_string())
        .bind(wildcard)
        .bind(restricted_resources)
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role grant: {error}")))?;

        Ok(())
    }

    async fn delete_grant(
        transaction: &mut Transaction<'static, Postgres>,
        key: &GrantKey,
    ) -> AppResult<u64> {
        sqlx::query(
            r#"
            DELETE FROM role_grants
            WHERE role = $1 AND user_id = $2 AND domain = $3 AND owner = $4
            "#,
        )
        .bind(key.role.as_str())
        .bind(key.user.as_uuid())
        .bind(key.domain.as_str())
        .bind(key.owner.to_string())
        .execute(&mut **transaction)
        .await
        .map(|result| result.rows_affected())
        .map_err(|error| AppError::Internal(format!("failed to delete role grant: {error}")))
    }

    async fn commit(transaction: Transaction<'static, Postgres>) -> AppResult<()> {
        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
    }

    fn decode_rows(rows: Vec<RoleGrantRow>) -> AppResult<Vec<RoleGrant>> {
        rows.into_iter().map(RoleGrant::try_from).collect()
    }
}

#[async_trait]
impl PolicyStore for PostgresPolicyStore {
    async fn add_grant(&self, key: GrantKey, restriction: Restriction) -> AppResult<GrantChange> {
        let mut transaction = self.begin().await?;
        let existing = Self::lock_grant(&mut transaction, &key).await?;
        let (merged, change) = Restriction::merge(existing.as_ref(), &restriction);

        match (existing, change) {
            (_, GrantChange::Unchanged) => {}
            (None, _) => {
                let (wildcard, restricted_resources) = restriction_columns(&merged)?;
                sqlx::query(
                    r#"
                    INSERT INTO role_grants (role, user_id, domain, owner, wildcard, restricted_resources)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(key.role.as_str())
                .bind(key.user.as_uuid())
                .bind(key.domain.as_str())
                .bind(key.owner.to_string())
                .bind(wildcard)
                .bind(restricted_resources)
                .execute(&mut *transaction)
                .await
                .map_err(|error| grant_conflict_or_internal(error, "insert role grant"))?;
            }
            (Some(_), _) => Self::write_restriction(&mut transaction, &key, &merged).await?,
        }

        Self::commit(transaction).await?;
        Ok(change)
    }

    async fn remove_resources(
        &self,
        key: GrantKey,
        resources: BTreeSet<ResourceRef>,
    ) -> AppResult<GrantRemoval> {
        let mut transaction = self.begin().await?;
        let current = Self::lock_grant(&mut transaction, &key)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{}' holds no role '{}' for owner '{}'",
                    key.user,
                    key.role.as_str(),
                    key.owner
                ))
            })?;

        let removal = match current.without(&resources)? {
            Some(remaining) => {
                Self::write_restriction(&mut transaction, &key, &remaining).await?;
                GrantRemoval::Narrowed
            }
            None => {
                Self::delete_grant(&mut transaction, &key).await?;
                GrantRemoval::Deleted
            }
        };

        Self::commit(transaction).await?;
        Ok(removal)
    }

    async fn remove_grant(&self, key: GrantKey) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        if Self::delete_grant(&mut transaction, &key).await? == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' holds no role '{}' for owner '{}'",
                key.user,
                key.role.as_str(),
                key.owner
            )));
        }

        Self::commit(transaction).await
    }

    async fn find_grant(&self, key: GrantKey) -> AppResult<Option<RoleGrant>> {
        let row = sqlx::query_as::<_, RoleGrantRow>(
            format!(
                "{SELECT_GRANT_COLUMNS} WHERE role = $1 AND user_id = $2 AND domain = $3 AND owner = $4"
            )
            .as_str(),
        )
        .bind(key.role.as_str())
        .bind(key.user.as_uuid())
        .bind(key.domain.as_str())
        .bind(key.owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role grant: {error}")))?;

        row.map(RoleGrant::try_from).transpose()
    }

    async fn grants_for_user(
        &self,
        user: PrincipalId,
        domain: PolicyDomain,
    ) -> AppResult<Vec<RoleGrant>> {
        let rows = sqlx::query_as::<_, RoleGrantRow>(
            format!("{SELECT_GRANT_COLUMNS} WHERE user_id = $1 AND domain = $2 ORDER BY role, owner")
                .as_str(),
        )
        .bind(user.as_uuid())
        .bind(domain.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role grants for user '{user}': {error}"))
        })?;

        Self::decode_rows(rows)
    }

    async fn grants_for_owner(
        &self,
        domain: PolicyDomain,
        owner: Owner,
    ) -> AppResult<Vec<RoleGrant>> {
        let rows = sqlx::query_as::<_, RoleGrantRow>(
            format!("{SELECT_GRANT_COLUMNS} WHERE domain = $1 AND owner = $2 ORDER BY user_id, role")
                .as_str(),
        )
        .bind(domain.as_str())
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role grants for owner '{owner}': {error}"))
        })?;

        Self::decode_rows(rows)
    }

    async fn purge_resource(
        &self,
        domain: PolicyDomain,
        owner: Owner,
        resource: &ResourceRef,
    ) -> AppResult<usize> {
        let needle = serde_json::to_value([resource]).map_err(|error| {
            AppError::Internal(format!("failed to encode purged resource: {error}"))
        })?;

        let mut transaction = self.begin().await?;
        let rows = sqlx::query_as::<_, RoleGrantRow>(
            format!(
                "{SELECT_GRANT_COLUMNS} WHERE domain = $1 AND owner = $2 AND NOT wildcard AND restricted_resources @> $3 FOR UPDATE"
            )
            .as_str(),
        )
        .bind(domain.as_str())
        .bind(owner.to_string())
        .bind(needle)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role grants: {error}")))?;

        let mut changed = 0;
        for row in rows {
            let grant = RoleGrant::try_from(row)?;
            let key = grant.key();
            match grant.restriction.purge(resource) {
                RestrictionPurge::Untouched => continue,
                RestrictionPurge::Narrowed(remaining) => {
                    Self::write_restriction(&mut transaction, &key, &remaining).await?;
                }
                RestrictionPurge::Emptied => {
                    Self::delete_grant(&mut transaction, &key).await?;
                }
            }
            changed += 1;
        }

        Self::commit(transaction).await?;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests;
