//! Statistics repository.
//!
//! Fetches the organization's full case set and delegates the aggregation
//! to the pure domain computation, which keeps the bucketing and rate
//! logic unit-testable without a database.

use chrono::Utc;
use domain::models::{Statistics, VehicleCase};
use domain::services::statistics::compute_statistics;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::VehicleCaseEntity;

/// Repository for org-wide case statistics.
#[derive(Clone)]
pub struct StatisticsRepository {
    pool: PgPool,
}

impl StatisticsRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute statistics over all of an organization's cases, optionally
    /// scoped to one handler. The handler-scoped report drops the
    /// per-handler breakdown since it would hold a single row.
    pub async fn org_statistics(
        &self,
        org_id: Uuid,
        handler_user_id: Option<Uuid>,
    ) -> Result<Statistics, sqlx::Error> {
        let cases = self.fetch_cases(org_id, handler_user_id).await?;
        let today = Utc::now().date_naive();
        Ok(compute_statistics(&cases, today, handler_user_id.is_some()))
    }

    async fn fetch_cases(
        &self,
        org_id: Uuid,
        handler_user_id: Option<Uuid>,
    ) -> Result<Vec<VehicleCase>, sqlx::Error> {
        let entities = match handler_user_id {
            Some(handler) => {
                sqlx::query_as::<_, VehicleCaseEntity>(
                    r#"
                    SELECT id, org_id, registration_number, dropoff_location_id, funding_source,
                           insurance_status, photo_inspection_done, raknad_pa, handler_user_id,
                           handler_note, klar, archived_at, archived_by, created_at, updated_at,
                           created_by, updated_by
                    FROM vehicle_cases
                    WHERE org_id = $1 AND handler_user_id = $2
                    "#,
                )
                .bind(org_id)
                .bind(handler)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, VehicleCaseEntity>(
                    r#"
                    SELECT id, org_id, registration_number, dropoff_location_id, funding_source,
                           insurance_status, photo_inspection_done, raknad_pa, handler_user_id,
                           handler_note, klar, archived_at, archived_by, created_at, updated_at,
                           created_by, updated_by
                    FROM vehicle_cases
                    WHERE org_id = $1
                    "#,
                )
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(entities.into_iter().map(Into::into).collect())
    }
}
