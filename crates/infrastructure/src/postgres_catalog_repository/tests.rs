use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use vendorhub_application::CatalogRepository;
use vendorhub_core::{AppError, PrincipalId};
use vendorhub_domain::{Bundle, BundleId, Game, GameId, Package, PackageId, Vendor, VendorId};

use super::PostgresCatalogRepository;

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
        panic!("failed to run migrations for postgres catalog tests: {error}");
    }

    Some(pool)
}

async fn ensure_manager(pool: &PgPool) -> PrincipalId {
    let manager = PrincipalId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO users (id, subject, display_name)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(manager.as_uuid())
    .bind(format!("test|{manager}"))
    .bind("Catalog Manager")
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    manager
}

async fn seeded_vendor(repository: &PostgresCatalogRepository, pool: &PgPool) -> Vendor {
    let vendor = Vendor {
        id: VendorId::new(),
        name: "Acme".to_owned(),
        manager: ensure_manager(pool).await,
        approved: false,
    };
    assert!(repository.save_vendor(vendor.clone()).await.is_ok());
    vendor
}

#[tokio::test]
async fn vendor_upsert_updates_name_and_approval() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCatalogRepository::new(pool.clone());
    let mut vendor = seeded_vendor(&repository, &pool).await;

    vendor.name = "Acme Games".to_owned();
    vendor.approved = true;
    assert!(repository.save_vendor(vendor.clone()).await.is_ok());

    let stored = repository.find_vendor(vendor.id).await;
    assert_eq!(stored.ok().flatten(), Some(vendor.clone()));

    let managed = repository.list_vendors(Some(vendor.manager)).await;
    assert_eq!(managed.map(|vendors| vendors.len()).ok(), Some(1));
}

#[tokio::test]
async fn package_membership_follows_game_deletion() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCatalogRepository::new(pool.clone());
    let vendor = seeded_vendor(&repository, &pool).await;

    let game = Game {
        id: GameId::new(),
        vendor_id: vendor.id,
        name: "Space Race".to_owned(),
    };
    let package = Package {
        id: PackageId::new(),
        vendor_id: vendor.id,
        name: "Starter".to_owned(),
        game_ids: vec![game.id],
    };
    let bundle = Bundle {
        id: BundleId::new(),
        vendor_id: vendor.id,
        name: "Everything".to_owned(),
        package_ids: vec![package.id],
    };
    assert!(repository.save_game(game.clone()).await.is_ok());
    assert!(repository.save_package(package.clone()).await.is_ok());
    assert!(repository.save_bundle(bundle.clone()).await.is_ok());

    let stored_bundle = repository.find_bundle(bundle.id).await;
    assert_eq!(stored_bundle.ok().flatten(), Some(bundle.clone()));

    assert!(repository.delete_game(game.id).await.is_ok());
    let stored_package = repository.find_package(package.id).await;
    assert!(stored_package.is_ok_and(|package| package.is_some_and(|package| package.game_ids.is_empty())));

    assert!(matches!(
        repository.delete_game(game.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn game_for_unknown_vendor_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCatalogRepository::new(pool);

    let result = repository
        .save_game(Game {
            id: GameId::new(),
            vendor_id: VendorId::new(),
            name: "Orphan".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
