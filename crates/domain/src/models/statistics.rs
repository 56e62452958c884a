//! Statistics response models.
//!
//! All time-series buckets are zero-filled before data is folded in so that
//! chart x-axes stay stable even when no cases fall in a bucket.

use serde::Serialize;
use uuid::Uuid;

/// Per-org (or per-handler) statistics rollup.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total: i64,
    pub ongoing: i64,
    pub archived: i64,
    pub by_funding_source: FundingSourceCounts,
    pub by_insurance_status: InsuranceStatusCounts,
    /// Omitted when the statistics are scoped to a single handler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_handler: Option<Vec<HandlerStats>>,
    /// Cases created per weekday, last 30 weekdays, oldest first.
    pub by_day: Vec<TimeBucket>,
    /// Cases created per ISO week (Monday-aligned key), last 12 weeks.
    pub by_week: Vec<TimeBucket>,
    /// Cases created per calendar month, last 12 months.
    pub by_month: Vec<TimeBucket>,
    /// Whole-day average between creation and archival for completed cases;
    /// absent when no case has completed yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_processing_days: Option<i64>,
}

/// Case counts per funding source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FundingSourceCounts {
    pub insurance: i64,
    pub internal: i64,
    pub customer: i64,
}

/// Case counts per insurance status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsuranceStatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// Per-handler rollup with completion rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerStats {
    pub handler_user_id: Uuid,
    pub total: i64,
    pub ongoing: i64,
    pub completed: i64,
    /// `completed / total` as a rounded percentage; 0 when total is 0.
    pub completion_rate: i64,
}

/// One zero-fillable time-series bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    /// Bucket key: `YYYY-MM-DD` for days and week starts, `YYYY-MM` for
    /// months.
    pub key: String,
    pub count: i64,
}
