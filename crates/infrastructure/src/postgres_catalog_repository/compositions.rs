use super::*;

const SELECT_PACKAGES: &str = r#"
    SELECT
        packages.id,
        packages.vendor_id,
        packages.name,
        COALESCE(
            array_agg(package_games.game_id ORDER BY package_games.game_id)
                FILTER (WHERE package_games.game_id IS NOT NULL),
            '{}'
        ) AS member_ids
    FROM packages
    LEFT JOIN package_games ON package_games.package_id = packages.id
"#;

const SELECT_BUNDLES: &str = r#"
    SELECT
        bundles.id,
        bundles.vendor_id,
        bundles.name,
        COALESCE(
            array_agg(bundle_packages.package_id ORDER BY bundle_packages.package_id)
                FILTER (WHERE bundle_packages.package_id IS NOT NULL),
            '{}'
        ) AS member_ids
    FROM bundles
    LEFT JOIN bundle_packages ON bundle_packages.bundle_id = bundles.id
"#;

impl PostgresCatalogRepository {
    pub(super) async fn find_package_impl(
        &self,
        package_id: PackageId,
    ) -> AppResult<Option<Package>> {
        let row = sqlx::query_as::<_, PackageRow>(
            format!("{SELECT_PACKAGES} WHERE packages.id = $1 GROUP BY packages.id").as_str(),
        )
        .bind(package_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find package: {error}")))?;

        Ok(row.map(Package::from))
    }

    pub(super) async fn list_packages_impl(&self, vendor_id: VendorId) -> AppResult<Vec<Package>> {
        let rows = sqlx::query_as::<_, PackageRow>(
            format!(
                "{SELECT_PACKAGES} WHERE packages.vendor_id = $1 GROUP BY packages.id ORDER BY packages.name, packages.id"
            )
            .as_str(),
        )
        .bind(vendor_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list packages: {error}")))?;

        Ok(rows.into_iter().map(Package::from).collect())
    }

    pub(super) async fn save_package_impl(&self, package: Package) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO packages (id, vendor_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(package.id.as_uuid())
        .bind(package.vendor_id.as_uuid())
        .bind(package.name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| foreign_key_or_internal(error, "save package"))?;

        for game_id in &package.game_ids {
            sqlx::query(
                r#"
                INSERT INTO package_games (package_id, game_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(package.id.as_uuid())
            .bind(game_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| foreign_key_or_internal(error, "save package games"))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }

    pub(super) async fn find_bundle_impl(&self, bundle_id: BundleId) -> AppResult<Option<Bundle>> {
        let row = sqlx::query_as::<_, BundleRow>(
            format!("{SELECT_BUNDLES} WHERE bundles.id = $1 GROUP BY bundles.id").as_str(),
        )
        .bind(bundle_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find bundle: {error}")))?;

        Ok(row.map(Bundle::from))
    }

    pub(super) async fn list_bundles_impl(&self, vendor_id: VendorId) -> AppResult<Vec<Bundle>> {
        let rows = sqlx::query_as::<_, BundleRow>(
            format!(
                "{SELECT_BUNDLES} WHERE bundles.vendor_id = $1 GROUP BY bundles.id ORDER BY bundles.name, bundles.id"
            )
            .as_str(),
        )
        .bind(vendor_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list bundles: {error}")))?;

        Ok(rows.into_iter().map(Bundle::from).collect())
    }

    pub(super) async fn save_bundle_impl(&self, bundle: Bundle) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO bundles (id, vendor_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(bundle.id.as_uuid())
        .bind(bundle.vendor_id.as_uuid())
        .bind(bundle.name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| foreign_key_or_internal(error, "save bundle"))?;

        for package_id in &bundle.package_ids {
            sqlx::query(
                r#"
                INSERT INTO bundle_packages (bundle_id, package_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(bundle.id.as_uuid())
            .bind(package_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| foreign_key_or_internal(error, "save bundle packages"))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }
}
