use super::*;

impl PostgresCatalogRepository {
    pub(super) async fn find_vendor_impl(&self, vendor_id: VendorId) -> AppResult<Option<Vendor>> {
        let row = sqlx::query_as::<_, VendorRow>(
            r#"
            SELECT id, name, manager_id, approved
            FROM vendors
            WHERE id = $1
            "#,
        )
        .bind(vendor_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find vendor: {error}")))?;

        Ok(row.map(Vendor::from))
    }

    pub(super) async fn list_vendors_impl(
        &self,
        manager: Option<PrincipalId>,
    ) -> AppResult<Vec<Vendor>> {
        let rows = sqlx::query_as::<_, VendorRow>(
            r#"
            SELECT id, name, manager_id, approved
            FROM vendors
            WHERE $1::UUID IS NULL OR manager_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(manager.map(|manager| manager.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list vendors: {error}")))?;

        Ok(rows.into_iter().map(Vendor::from).collect())
    }

    pub(super) async fn save_vendor_impl(&self, vendor: Vendor) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vendors (id, name, manager_id, approved)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                approved = EXCLUDED.approved,
                updated_at = now()
            "#,
        )
        .bind(vendor.id.as_uuid())
        .bind(vendor.name)
        .bind(vendor.manager.as_uuid())
        .bind(vendor.approved)
        .execute(&self.pool)
        .await
        .map_err(|error| foreign_key_or_internal(error, "save vendor"))?;

        Ok(())
    }

    pub(super) async fn find_game_impl(&self, game_id: GameId) -> AppResult<Option<Game>> {
        let row = sqlx::query_as::<_, GameRow>(
            r#"
            SELECT id, vendor_id, name
            FROM games
            WHERE id = $1
            "#,
        )
        .bind(game_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find game: {error}")))?;

        Ok(row.map(Game::from))
    }

    pub(super) async fn list_games_impl(&self, vendor_id: VendorId) -> AppResult<Vec<Game>> {
        let rows = sqlx::query_as::<_, GameRow>(
            r#"
            SELECT id, vendor_id, name
            FROM games
            WHERE vendor_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(vendor_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list games: {error}")))?;

        Ok(rows.into_iter().map(Game::from).collect())
    }

    pub(super) async fn save_game_impl(&self, game: Game) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO games (id, vendor_id, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                updated_at = now()
            "#,
        )
        .bind(game.id.as_uuid())
        .bind(game.vendor_id.as_uuid())
        .bind(game.name)
        .execute(&self.pool)
        .await
        .map_err(|error| foreign_key_or_internal(error, "save game"))?;

        Ok(())
    }
}
