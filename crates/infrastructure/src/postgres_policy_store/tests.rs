use std::collections::BTreeSet;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use vendorhub_application::PolicyStore;
use vendorhub_core::{AppError, PrincipalId};
use vendorhub_domain::{
    GrantChange, GrantKey, GrantRemoval, Owner, PolicyDomain, ResourceRef, ResourceType,
    Restriction, Role,
};

use super::PostgresPolicyStore;

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
        panic!("failed to run migrations for postgres policy store tests: {error}");
    }

    Some(pool)
}

async fn ensure_user(pool: &PgPool) -> PrincipalId {
    let user_id = PrincipalId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO users (id, subject, display_name)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(user_id.as_uuid())
    .bind(format!("test|{user_id}"))
    .bind("Policy Test User")
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    user_id
}

fn game(id: &str) -> ResourceRef {
    ResourceRef::new(ResourceType::Game, id)
}

fn support_key(user: PrincipalId, owner: PrincipalId) -> GrantKey {
    GrantKey {
        role: Role::Support,
        user,
        domain: PolicyDomain::Vendor,
        owner: Owner::Principal(owner),
    }
}

#[tokio::test]
async fn add_unions_and_reports_unchanged() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresPolicyStore::new(pool.clone());
    let key = support_key(ensure_user(&pool).await, PrincipalId::new());

    let created = store
        .add_grant(key, Restriction::restricted([game("a")]))
        .await;
    let extended = store
        .add_grant(key, Restriction::restricted([game("b")]))
        .await;
    let unchanged = store
        .add_grant(key, Restriction::restricted([game("a")]))
        .await;

    assert!(matches!(created, Ok(GrantChange::Created)));
    assert!(matches!(extended, Ok(GrantChange::Extended)));
    assert!(matches!(unchanged, Ok(GrantChange::Unchanged)));

    let stored = store.find_grant(key).await;
    assert_eq!(
        stored.ok().flatten().map(|grant| grant.restriction),
        Some(Restriction::restricted([game("a"), game("b")]))
    );
}

#[tokio::test]
async fn remove_resources_is_all_or_nothing() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresPolicyStore::new(pool.clone());
    let key = support_key(ensure_user(&pool).await, PrincipalId::new());
    assert!(
        store
            .add_grant(key, Restriction::restricted([game("a"), game("b")]))
            .await
            .is_ok()
    );

    let partial = store
        .remove_resources(key, BTreeSet::from([game("a"), game("missing")]))
        .await;
    assert!(matches!(partial, Err(AppError::NotFound(_))));

    let narrowed = store.remove_resources(key, BTreeSet::from([game("a")])).await;
    let deleted = store.remove_resources(key, BTreeSet::from([game("b")])).await;
    assert!(matches!(narrowed, Ok(GrantRemoval::Narrowed)));
    assert!(matches!(deleted, Ok(GrantRemoval::Deleted)));
    assert!(matches!(store.find_grant(key).await, Ok(None)));
}

#[tokio::test]
async fn queries_are_scoped_by_user_and_owner() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresPolicyStore::new(pool.clone());
    let user = ensure_user(&pool).await;
    let (first_owner, second_owner) = (PrincipalId::new(), PrincipalId::new());

    assert!(
        store
            .add_grant(support_key(user, first_owner), Restriction::Wildcard)
            .await
            .is_ok()
    );
    assert!(
        store
            .add_grant(
                support_key(user, second_owner),
                Restriction::restricted([game("x")])
            )
            .await
            .is_ok()
    );
    assert!(
        store
            .add_grant(GrantKey::super_admin(user), Restriction::Wildcard)
            .await
            .is_ok()
    );

    let by_user = store.grants_for_user(user, PolicyDomain::Vendor).await;
    let by_owner = store
        .grants_for_owner(PolicyDomain::Vendor, Owner::Principal(first_owner))
        .await;
    let admin = store.find_grant(GrantKey::super_admin(user)).await;

    assert_eq!(by_user.map(|grants| grants.len()).ok(), Some(2));
    assert!(by_owner.is_ok_and(|grants| {
        grants.len() == 1 && grants[0].user == user && grants[0].restriction.is_wildcard()
    }));
    assert!(admin.is_ok_and(|grant| grant.is_some_and(|grant| grant.owner == Owner::Global)));
}

#[tokio::test]
async fn purge_resource_narrows_and_deletes() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresPolicyStore::new(pool.clone());
    let owner = PrincipalId::new();
    let (first, second) = (ensure_user(&pool).await, ensure_user(&pool).await);

    assert!(
        store
            .add_grant(
                support_key(first, owner),
                Restriction::restricted([game("gone"), game("kept")])
            )
            .await
            .is_ok()
    );
    assert!(
        store
            .add_grant(support_key(second, owner), Restriction::restricted([game("gone")]))
            .await
            .is_ok()
    );

    let purged = store
        .purge_resource(PolicyDomain::Vendor, Owner::Principal(owner), &game("gone"))
        .await;
    assert!(matches!(purged, Ok(2)));

    let first_grant = store.find_grant(support_key(first, owner)).await;
    assert_eq!(
        first_grant.ok().flatten().map(|grant| grant.restriction),
        Some(Restriction::restricted([game("kept")]))
    );
    assert!(matches!(
        store.find_grant(support_key(second, owner)).await,
        Ok(None)
    ));
}
