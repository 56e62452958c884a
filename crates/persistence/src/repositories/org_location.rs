//! Org location repository for database operations.
//!
//! A partial unique index guarantees at most one default location per
//! organization; the default swap demotes and promotes inside one
//! transaction so no reader ever observes two defaults or none.

use domain::models::OrgLocation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::OrgLocationEntity;

const LOCATION_COLUMNS: &str = "id, org_id, name, is_default, created_at, updated_at";

// The partial unique index on (org_id) WHERE is_default is checked per
// updated row, so the old default must be cleared in its own statement
// before another row may be promoted.
const DEMOTE_DEFAULT_SQL: &str = "UPDATE org_locations SET is_default = false, updated_at = now() \
     WHERE org_id = $1 AND is_default AND id <> $2";

/// Input for inserting an org location.
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub org_id: Uuid,
    pub name: String,
    pub is_default: bool,
}

/// Outcome of a location delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteLocationOutcome {
    Deleted,
    NotFound,
    /// The default location cannot be deleted; another location must be
    /// promoted first.
    IsDefault,
}

/// Repository for org location database operations.
#[derive(Clone)]
pub struct OrgLocationRepository {
    pool: PgPool,
}

impl OrgLocationRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List an organization's locations ordered by name.
    pub async fn list(&self, org_id: Uuid) -> Result<Vec<OrgLocation>, sqlx::Error> {
        let entities = sqlx::query_as::<_, OrgLocationEntity>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM org_locations
            WHERE org_id = $1
            ORDER BY name ASC
            "#,
        ))
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Find a location by id, scoped to the organization.
    pub async fn find_by_id(
        &self,
        org_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<OrgLocation>, sqlx::Error> {
        let entity = sqlx::query_as::<_, OrgLocationEntity>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM org_locations
            WHERE id = $1 AND org_id = $2
            "#,
        ))
        .bind(location_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find the organization's default location, if one is set.
    pub async fn find_default(&self, org_id: Uuid) -> Result<Option<OrgLocation>, sqlx::Error> {
        let entity = sqlx::query_as::<_, OrgLocationEntity>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM org_locations
            WHERE org_id = $1 AND is_default
            "#,
        ))
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Insert a location. When the new location is marked default, the
    /// previous default is demoted in the same transaction so the partial
    /// unique index is never violated.
    pub async fn insert(&self, input: NewLocation) -> Result<OrgLocation, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query(
                "UPDATE org_locations SET is_default = false, updated_at = now() \
                 WHERE org_id = $1 AND is_default",
            )
            .bind(input.org_id)
            .execute(&mut *tx)
            .await?;
        }

        let entity = sqlx::query_as::<_, OrgLocationEntity>(&format!(
            r#"
            INSERT INTO org_locations (org_id, name, is_default)
            VALUES ($1, $2, $3)
            RETURNING {LOCATION_COLUMNS}
            "#,
        ))
        .bind(input.org_id)
        .bind(&input.name)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity.into())
    }

    /// Rename a location.
    pub async fn rename(
        &self,
        org_id: Uuid,
        location_id: Uuid,
        name: &str,
    ) -> Result<Option<OrgLocation>, sqlx::Error> {
        let entity = sqlx::query_as::<_, OrgLocationEntity>(&format!(
            r#"
            UPDATE org_locations
            SET name = $3, updated_at = now()
            WHERE id = $1 AND org_id = $2
            RETURNING {LOCATION_COLUMNS}
            "#,
        ))
        .bind(location_id)
        .bind(org_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Promote a location to the organization's default.
    ///
    /// Demotes the old default and promotes the target in one transaction;
    /// readers never observe two defaults or none. Returns the promoted
    /// location, or `None` when the target does not belong to the
    /// organization (the transaction rolls back and the old default stays).
    pub async fn set_default(
        &self,
        org_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<OrgLocation>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(DEMOTE_DEFAULT_SQL)
            .bind(org_id)
            .bind(location_id)
            .execute(&mut *tx)
            .await?;

        let Some(entity) = sqlx::query_as::<_, OrgLocationEntity>(&format!(
            r#"
            UPDATE org_locations
            SET is_default = true, updated_at = now()
            WHERE id = $2 AND org_id = $1
            RETURNING {LOCATION_COLUMNS}
            "#,
        ))
        .bind(org_id)
        .bind(location_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        tx.commit().await?;
        Ok(Some(entity.into()))
    }

    /// Delete a location unless it is the default.
    pub async fn delete(
        &self,
        org_id: Uuid,
        location_id: Uuid,
    ) -> Result<DeleteLocationOutcome, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM org_locations \
             WHERE id = $1 AND org_id = $2 AND is_default = false",
        )
        .bind(location_id)
        .bind(org_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(DeleteLocationOutcome::Deleted);
        }

        // The delete matched nothing: either the row is missing or it is
        // the protected default.
        match self.find_by_id(org_id, location_id).await? {
            Some(location) if location.is_default => Ok(DeleteLocationOutcome::IsDefault),
            _ => Ok(DeleteLocationOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demote_runs_before_promote_and_skips_the_target() {
        // Demoting everything except the target means the per-row unique
        // check never sees two defaults, regardless of row order.
        assert!(DEMOTE_DEFAULT_SQL.contains("is_default = false"));
        assert!(DEMOTE_DEFAULT_SQL.contains("id <> $2"));
        assert!(DEMOTE_DEFAULT_SQL.contains("org_id = $1 AND is_default"));
    }
}
