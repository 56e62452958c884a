//! Vehicle case repository for database operations.
//!
//! Every mutation is scoped by both case id and org id: a case outside the
//! caller's organization behaves as if it did not exist. Audit rows are
//! written according to the configured [`AuditMode`]: in strict mode the
//! mutation and its audit share one transaction; in best-effort mode the
//! mutation commits first and an audit failure is only logged.

use domain::models::{
    AuditMode, AuditedChange, CaseFilters, CreateCaseAuditInput, FundingSource, InsuranceStatus,
    UpdateVehicleCase, VehicleCase,
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{FundingSourceDb, InsuranceStatusDb, VehicleCaseEntity};
use crate::repositories::vehicle_case_audit::insert_audit;

use shared::pagination::Page;

const CASE_COLUMNS: &str = "id, org_id, registration_number, dropoff_location_id, funding_source, \
     insurance_status, photo_inspection_done, raknad_pa, handler_user_id, handler_note, \
     klar, archived_at, archived_by, created_at, updated_at, created_by, updated_by";

/// Input for inserting a vehicle case.
///
/// The registration number must already be normalized; the handler is the
/// creating user.
#[derive(Debug, Clone)]
pub struct NewVehicleCase {
    pub org_id: Uuid,
    pub registration_number: String,
    pub dropoff_location_id: Uuid,
    pub funding_source: FundingSource,
    pub insurance_status: InsuranceStatus,
    pub handler_note: Option<String>,
    pub created_by: Uuid,
}

/// Helper struct for building dynamic WHERE clauses from case filters.
/// Tracks conditions and parameter positions to avoid code duplication.
struct CaseFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl CaseFilterBuilder {
    /// Build filter conditions for one archived/ongoing partition.
    fn build(archived: bool, filters: &CaseFilters) -> Self {
        let mut conditions = vec!["org_id = $1".to_string()];
        if archived {
            conditions.push("archived_at IS NOT NULL".to_string());
        } else {
            conditions.push("archived_at IS NULL".to_string());
        }
        let mut param_count = 1;

        if filters.search.is_some() {
            param_count += 1;
            conditions.push(format!("registration_number ILIKE ${}", param_count));
        }

        if filters.funding_source.is_some() {
            param_count += 1;
            conditions.push(format!("funding_source = ${}", param_count));
        }

        if filters.insurance_status.is_some() {
            param_count += 1;
            conditions.push(format!("insurance_status = ${}", param_count));
        }

        if filters.dropoff_location_id.is_some() {
            param_count += 1;
            conditions.push(format!("dropoff_location_id = ${}", param_count));
        }

        if filters.handler_user_id.is_some() {
            param_count += 1;
            conditions.push(format!("handler_user_id = ${}", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    /// Get the WHERE clause as a string.
    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    /// Get the current parameter count.
    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Escapes LIKE metacharacters so a search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Macro to bind case filter parameters to a SQLx builder.
/// This avoids code duplication for binding optional query parameters.
macro_rules! bind_case_filters {
    ($builder:expr, $filters:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $filters.search {
            b = b.bind(format!("%{}%", escape_like(search)));
        }
        if let Some(funding) = $filters.funding_source {
            b = b.bind(FundingSourceDb::from(funding));
        }
        if let Some(status) = $filters.insurance_status {
            b = b.bind(InsuranceStatusDb::from(status));
        }
        if let Some(location_id) = $filters.dropoff_location_id {
            b = b.bind(location_id);
        }
        if let Some(handler) = $filters.handler_user_id {
            b = b.bind(handler);
        }
        b
    }};
}

/// Helper struct for building the dynamic SET clause of a field update.
struct CaseUpdateBuilder {
    assignments: Vec<String>,
    param_count: i32,
}

impl CaseUpdateBuilder {
    /// Build SET assignments from an update payload. Parameters $1-$3 are
    /// reserved for case id, org id and the updating user.
    fn build(updates: &UpdateVehicleCase) -> Self {
        let mut assignments = vec!["updated_at = now()".to_string(), "updated_by = $3".to_string()];
        let mut param_count = 3;

        let mut push = |column: &str, count: &mut i32, assignments: &mut Vec<String>| {
            *count += 1;
            assignments.push(format!("{} = ${}", column, count));
        };

        if updates.registration_number.is_some() {
            push("registration_number", &mut param_count, &mut assignments);
        }
        if updates.dropoff_location_id.is_some() {
            push("dropoff_location_id", &mut param_count, &mut assignments);
        }
        if updates.funding_source.is_some() {
            push("funding_source", &mut param_count, &mut assignments);
        }
        if updates.insurance_status.is_some() {
            push("insurance_status", &mut param_count, &mut assignments);
        }
        if updates.photo_inspection_done.is_some() {
            push("photo_inspection_done", &mut param_count, &mut assignments);
        }
        if updates.raknad_pa.is_some() {
            push("raknad_pa", &mut param_count, &mut assignments);
        }
        if updates.handler_note.is_some() {
            push("handler_note", &mut param_count, &mut assignments);
        }

        Self {
            assignments,
            param_count,
        }
    }

    fn set_clause(&self) -> String {
        self.assignments.join(", ")
    }

    fn has_field_assignments(&self) -> bool {
        self.param_count > 3
    }
}

/// Macro to bind update payload parameters in the builder's fixed order.
macro_rules! bind_case_updates {
    ($builder:expr, $updates:expr) => {{
        let mut b = $builder;
        if let Some(ref registration) = $updates.registration_number {
            b = b.bind(registration);
        }
        if let Some(location_id) = $updates.dropoff_location_id {
            b = b.bind(location_id);
        }
        if let Some(funding) = $updates.funding_source {
            b = b.bind(FundingSourceDb::from(funding));
        }
        if let Some(status) = $updates.insurance_status {
            b = b.bind(InsuranceStatusDb::from(status));
        }
        if let Some(done) = $updates.photo_inspection_done {
            b = b.bind(done);
        }
        if let Some(raknad) = $updates.raknad_pa {
            b = b.bind(raknad);
        }
        if let Some(ref note) = $updates.handler_note {
            b = b.bind(note);
        }
        b
    }};
}

fn snapshot_of(case: &VehicleCase) -> JsonValue {
    serde_json::to_value(case).unwrap_or(JsonValue::Null)
}

/// Repository for vehicle case database operations.
#[derive(Clone)]
pub struct VehicleCaseRepository {
    pool: PgPool,
}

impl VehicleCaseRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new case. The handler is auto-assigned to the creator.
    pub async fn insert(&self, input: NewVehicleCase) -> Result<VehicleCase, sqlx::Error> {
        let entity = sqlx::query_as::<_, VehicleCaseEntity>(&format!(
            r#"
            INSERT INTO vehicle_cases (
                org_id, registration_number, dropoff_location_id, funding_source,
                insurance_status, handler_user_id, handler_note, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {CASE_COLUMNS}
            "#,
        ))
        .bind(input.org_id)
        .bind(&input.registration_number)
        .bind(input.dropoff_location_id)
        .bind(FundingSourceDb::from(input.funding_source))
        .bind(InsuranceStatusDb::from(input.insurance_status))
        .bind(input.created_by)
        .bind(&input.handler_note)
        .bind(input.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a case by id, scoped to the organization.
    pub async fn find_by_id(
        &self,
        org_id: Uuid,
        case_id: Uuid,
    ) -> Result<Option<VehicleCase>, sqlx::Error> {
        let entity = sqlx::query_as::<_, VehicleCaseEntity>(&format!(
            r#"
            SELECT {CASE_COLUMNS}
            FROM vehicle_cases
            WHERE id = $1 AND org_id = $2
            "#,
        ))
        .bind(case_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List one archived/ongoing partition with conjunctive filters and
    /// offset pagination.
    ///
    /// The archived listing sorts by `archived_at` descending (most recently
    /// closed first); the ongoing listing by `created_at` descending. The
    /// returned count is the total of matching rows before pagination.
    pub async fn list(
        &self,
        org_id: Uuid,
        archived: bool,
        filters: &CaseFilters,
        page: Page,
    ) -> Result<(Vec<VehicleCase>, i64), sqlx::Error> {
        let filter = CaseFilterBuilder::build(archived, filters);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM vehicle_cases WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query).bind(org_id);
        let count_builder = bind_case_filters!(count_builder, filters);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let order_by = if archived {
            "archived_at DESC"
        } else {
            "created_at DESC"
        };

        let list_query = format!(
            r#"
            SELECT {CASE_COLUMNS}
            FROM vehicle_cases
            WHERE {where_clause}
            ORDER BY {order_by}
            LIMIT ${} OFFSET ${}
            "#,
            param_count + 1,
            param_count + 2
        );

        let list_builder = sqlx::query_as::<_, VehicleCaseEntity>(&list_query).bind(org_id);
        let list_builder = bind_case_filters!(list_builder, filters);
        let entities = list_builder
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Apply a prepared field update and append one audit row for the
    /// caller-specified change.
    ///
    /// Returns `None` when the case does not exist in the organization. The
    /// implicit `raknad_pa` side effect is expected to already be folded
    /// into `updates` (see `domain::services::case_update`); it surfaces in
    /// the audit row's snapshot only.
    pub async fn update(
        &self,
        org_id: Uuid,
        case_id: Uuid,
        updates: &UpdateVehicleCase,
        change: AuditedChange,
        updated_by: Uuid,
        mode: AuditMode,
    ) -> Result<Option<VehicleCase>, sqlx::Error> {
        let builder = CaseUpdateBuilder::build(updates);
        if !builder.has_field_assignments() {
            return self.find_by_id(org_id, case_id).await;
        }

        let update_query = format!(
            r#"
            UPDATE vehicle_cases
            SET {}
            WHERE id = $1 AND org_id = $2
            RETURNING {CASE_COLUMNS}
            "#,
            builder.set_clause(),
        );

        match mode {
            AuditMode::Strict => {
                let mut tx = self.pool.begin().await?;

                let query = sqlx::query_as::<_, VehicleCaseEntity>(&update_query)
                    .bind(case_id)
                    .bind(org_id)
                    .bind(updated_by);
                let query = bind_case_updates!(query, updates);
                let Some(entity) = query.fetch_optional(&mut *tx).await? else {
                    return Ok(None);
                };

                let case: VehicleCase = entity.into();
                insert_audit(
                    &mut *tx,
                    &CreateCaseAuditInput {
                        case_id,
                        org_id,
                        changed_by: updated_by,
                        change,
                        snapshot: snapshot_of(&case),
                    },
                )
                .await?;

                tx.commit().await?;
                Ok(Some(case))
            }
            AuditMode::BestEffort => {
                let query = sqlx::query_as::<_, VehicleCaseEntity>(&update_query)
                    .bind(case_id)
                    .bind(org_id)
                    .bind(updated_by);
                let query = bind_case_updates!(query, updates);
                let Some(entity) = query.fetch_optional(&self.pool).await? else {
                    return Ok(None);
                };

                let case: VehicleCase = entity.into();
                self.append_audit_best_effort(case_id, org_id, updated_by, change, &case)
                    .await;
                Ok(Some(case))
            }
        }
    }

    /// Archive a case: sets `klar`, `archived_at` and `archived_by` in one
    /// mutation and appends the terminal `klar` audit row.
    ///
    /// The `archived_at IS NULL` condition makes a concurrent double-archive
    /// lose the race and come back as `None`.
    pub async fn mark_klar(
        &self,
        org_id: Uuid,
        case_id: Uuid,
        archived_by: Uuid,
        mode: AuditMode,
    ) -> Result<Option<VehicleCase>, sqlx::Error> {
        let update_query = format!(
            r#"
            UPDATE vehicle_cases
            SET klar = true, archived_at = now(), archived_by = $3,
                updated_at = now(), updated_by = $3
            WHERE id = $1 AND org_id = $2 AND archived_at IS NULL
            RETURNING {CASE_COLUMNS}
            "#,
        );

        self.transition(org_id, case_id, archived_by, mode, &update_query, AuditedChange::klar_set())
            .await
    }

    /// Restore an archived case: clears `klar`, `archived_at` and
    /// `archived_by` together, never one alone.
    pub async fn restore(
        &self,
        org_id: Uuid,
        case_id: Uuid,
        restored_by: Uuid,
        mode: AuditMode,
    ) -> Result<Option<VehicleCase>, sqlx::Error> {
        let update_query = format!(
            r#"
            UPDATE vehicle_cases
            SET klar = false, archived_at = NULL, archived_by = NULL,
                updated_at = now(), updated_by = $3
            WHERE id = $1 AND org_id = $2 AND archived_at IS NOT NULL
            RETURNING {CASE_COLUMNS}
            "#,
        );

        self.transition(org_id, case_id, restored_by, mode, &update_query, AuditedChange::klar_cleared())
            .await
    }

    /// Hard delete, admin-only at the API layer. The audit trail written so
    /// far is removed with the case (cascade); there is no undo.
    pub async fn delete(&self, org_id: Uuid, case_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vehicle_cases WHERE id = $1 AND org_id = $2")
            .bind(case_id)
            .bind(org_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Shared execution of the two lifecycle transitions.
    async fn transition(
        &self,
        org_id: Uuid,
        case_id: Uuid,
        changed_by: Uuid,
        mode: AuditMode,
        update_query: &str,
        change: AuditedChange,
    ) -> Result<Option<VehicleCase>, sqlx::Error> {
        match mode {
            AuditMode::Strict => {
                let mut tx = self.pool.begin().await?;

                let Some(entity) = sqlx::query_as::<_, VehicleCaseEntity>(update_query)
                    .bind(case_id)
                    .bind(org_id)
                    .bind(changed_by)
                    .fetch_optional(&mut *tx)
                    .await?
                else {
                    return Ok(None);
                };

                let case: VehicleCase = entity.into();
                insert_audit(
                    &mut *tx,
                    &CreateCaseAuditInput {
                        case_id,
                        org_id,
                        changed_by,
                        change,
                        snapshot: snapshot_of(&case),
                    },
                )
                .await?;

                tx.commit().await?;
                Ok(Some(case))
            }
            AuditMode::BestEffort => {
                let Some(entity) = sqlx::query_as::<_, VehicleCaseEntity>(update_query)
                    .bind(case_id)
                    .bind(org_id)
                    .bind(changed_by)
                    .fetch_optional(&self.pool)
                    .await?
                else {
                    return Ok(None);
                };

                let case: VehicleCase = entity.into();
                self.append_audit_best_effort(case_id, org_id, changed_by, change, &case)
                    .await;
                Ok(Some(case))
            }
        }
    }

    /// Best-effort audit append: the case mutation has already committed, so
    /// a failure here is logged and swallowed. The audit trail may have gaps
    /// that the primary data does not.
    async fn append_audit_best_effort(
        &self,
        case_id: Uuid,
        org_id: Uuid,
        changed_by: Uuid,
        change: AuditedChange,
        case: &VehicleCase,
    ) {
        let input = CreateCaseAuditInput {
            case_id,
            org_id,
            changed_by,
            change,
            snapshot: snapshot_of(case),
        };

        if let Err(e) = insert_audit(&self.pool, &input).await {
            tracing::warn!(
                case_id = %case_id,
                field = %input.change.field,
                "Failed to append case audit row: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder_partitions_are_complementary() {
        let filters = CaseFilters::default();

        let ongoing = CaseFilterBuilder::build(false, &filters);
        assert_eq!(ongoing.where_clause(), "org_id = $1 AND archived_at IS NULL");

        let archived = CaseFilterBuilder::build(true, &filters);
        assert_eq!(
            archived.where_clause(),
            "org_id = $1 AND archived_at IS NOT NULL"
        );
    }

    #[test]
    fn test_filter_builder_composes_conjunctively() {
        let filters = CaseFilters {
            search: Some("abc".to_string()),
            funding_source: Some(FundingSource::Insurance),
            insurance_status: Some(InsuranceStatus::Pending),
            dropoff_location_id: Some(Uuid::new_v4()),
            handler_user_id: Some(Uuid::new_v4()),
        };

        let builder = CaseFilterBuilder::build(false, &filters);
        assert_eq!(
            builder.where_clause(),
            "org_id = $1 AND archived_at IS NULL AND registration_number ILIKE $2 \
             AND funding_source = $3 AND insurance_status = $4 \
             AND dropoff_location_id = $5 AND handler_user_id = $6"
        );
        assert_eq!(builder.param_count(), 6);
    }

    #[test]
    fn test_filter_builder_skips_absent_filters() {
        let filters = CaseFilters {
            handler_user_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let builder = CaseFilterBuilder::build(true, &filters);
        assert_eq!(
            builder.where_clause(),
            "org_id = $1 AND archived_at IS NOT NULL AND handler_user_id = $2"
        );
        assert_eq!(builder.param_count(), 2);
    }

    #[test]
    fn test_escape_like_neutralizes_metacharacters() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("ABC123"), "ABC123");
    }

    #[test]
    fn test_update_builder_set_clause() {
        let updates = UpdateVehicleCase {
            insurance_status: Some(InsuranceStatus::Approved),
            raknad_pa: Some(true),
            ..Default::default()
        };

        let builder = CaseUpdateBuilder::build(&updates);
        assert_eq!(
            builder.set_clause(),
            "updated_at = now(), updated_by = $3, insurance_status = $4, raknad_pa = $5"
        );
        assert!(builder.has_field_assignments());
    }

    #[test]
    fn test_update_builder_empty_payload() {
        let builder = CaseUpdateBuilder::build(&UpdateVehicleCase::default());
        assert!(!builder.has_field_assignments());
    }

    #[test]
    fn test_update_builder_full_payload_order() {
        let updates = UpdateVehicleCase {
            registration_number: Some("ABC123".to_string()),
            dropoff_location_id: Some(Uuid::new_v4()),
            funding_source: Some(FundingSource::Customer),
            insurance_status: Some(InsuranceStatus::Rejected),
            photo_inspection_done: Some(true),
            raknad_pa: Some(false),
            handler_note: Some("note".to_string()),
        };

        let builder = CaseUpdateBuilder::build(&updates);
        assert_eq!(
            builder.set_clause(),
            "updated_at = now(), updated_by = $3, registration_number = $4, \
             dropoff_location_id = $5, funding_source = $6, insurance_status = $7, \
             photo_inspection_done = $8, raknad_pa = $9, handler_note = $10"
        );
    }

    #[test]
    fn test_snapshot_serializes_case() {
        let now = chrono::Utc::now();
        let case = VehicleCase {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            registration_number: "ABC123".to_string(),
            dropoff_location_id: Uuid::new_v4(),
            funding_source: FundingSource::Internal,
            insurance_status: InsuranceStatus::Approved,
            photo_inspection_done: false,
            raknad_pa: true,
            handler_user_id: None,
            handler_note: None,
            klar: true,
            archived_at: Some(now),
            archived_by: None,
            created_at: now,
            updated_at: now,
            created_by: Uuid::new_v4(),
            updated_by: Uuid::new_v4(),
        };

        let snapshot = snapshot_of(&case);
        assert_eq!(snapshot["klar"], serde_json::json!(true));
        assert_eq!(snapshot["registration_number"], serde_json::json!("ABC123"));
        assert_eq!(snapshot["funding_source"], serde_json::json!("internal"));
    }
}
