//! Vehicle case audit repository for database operations.
//!
//! The audit table is append-only: inserts and chronological reads, nothing
//! else.

use domain::models::{CreateCaseAuditInput, VehicleCaseAudit};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::entities::VehicleCaseAuditEntity;

const AUDIT_COLUMNS: &str =
    "id, case_id, org_id, changed_by, field, old_value, new_value, changed_at, snapshot";

/// Appends one audit row on the given executor (pool or open transaction).
pub(crate) async fn insert_audit<'e, E>(
    executor: E,
    input: &CreateCaseAuditInput,
) -> Result<VehicleCaseAudit, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let entity = sqlx::query_as::<_, VehicleCaseAuditEntity>(&format!(
        r#"
        INSERT INTO vehicle_case_audits (case_id, org_id, changed_by, field, old_value, new_value, snapshot)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {AUDIT_COLUMNS}
        "#,
    ))
    .bind(input.case_id)
    .bind(input.org_id)
    .bind(input.changed_by)
    .bind(&input.change.field)
    .bind(&input.change.old_value)
    .bind(&input.change.new_value)
    .bind(&input.snapshot)
    .fetch_one(executor)
    .await?;

    Ok(entity.into())
}

/// Repository for vehicle case audit database operations.
#[derive(Clone)]
pub struct VehicleCaseAuditRepository {
    pool: PgPool,
}

impl VehicleCaseAuditRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit row.
    pub async fn insert(&self, input: CreateCaseAuditInput) -> Result<VehicleCaseAudit, sqlx::Error> {
        insert_audit(&self.pool, &input).await
    }

    /// List the audit trail of a case, oldest first for chronological
    /// display.
    pub async fn list_for_case(
        &self,
        org_id: Uuid,
        case_id: Uuid,
    ) -> Result<Vec<VehicleCaseAudit>, sqlx::Error> {
        let entities = sqlx::query_as::<_, VehicleCaseAuditEntity>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS}
            FROM vehicle_case_audits
            WHERE case_id = $1 AND org_id = $2
            ORDER BY changed_at ASC
            "#,
        ))
        .bind(case_id)
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }
}
