//! Statistics aggregation over the full case set of an organization.
//!
//! Buckets are initialized before any data is folded in, so every series has
//! a fixed length with explicit zeros for empty buckets.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::{
    FundingSource, FundingSourceCounts, HandlerStats, InsuranceStatus, InsuranceStatusCounts,
    Statistics, TimeBucket, VehicleCase,
};

/// Number of weekday buckets in the daily series.
const DAILY_BUCKETS: usize = 30;

/// Number of ISO-week buckets in the weekly series.
const WEEKLY_BUCKETS: usize = 12;

/// Number of calendar-month buckets in the monthly series.
const MONTHLY_BUCKETS: usize = 12;

/// Computes the statistics rollup for the given cases.
///
/// `today` anchors the time series; callers pass the current date. When
/// `handler_scoped` is set the per-handler breakdown is omitted (the cases
/// are already filtered to one handler and the breakdown would be a single
/// row).
pub fn compute_statistics(
    cases: &[VehicleCase],
    today: NaiveDate,
    handler_scoped: bool,
) -> Statistics {
    let total = cases.len() as i64;
    let archived = cases.iter().filter(|c| !c.is_ongoing()).count() as i64;
    let ongoing = total - archived;

    let mut by_funding_source = FundingSourceCounts::default();
    let mut by_insurance_status = InsuranceStatusCounts::default();
    for case in cases {
        match case.funding_source {
            FundingSource::Insurance => by_funding_source.insurance += 1,
            FundingSource::Internal => by_funding_source.internal += 1,
            FundingSource::Customer => by_funding_source.customer += 1,
        }
        match case.insurance_status {
            InsuranceStatus::Pending => by_insurance_status.pending += 1,
            InsuranceStatus::Approved => by_insurance_status.approved += 1,
            InsuranceStatus::Rejected => by_insurance_status.rejected += 1,
        }
    }

    let per_handler = if handler_scoped {
        None
    } else {
        Some(handler_breakdown(cases))
    };

    Statistics {
        total,
        ongoing,
        archived,
        by_funding_source,
        by_insurance_status,
        per_handler,
        by_day: daily_series(cases, today),
        by_week: weekly_series(cases, today),
        by_month: monthly_series(cases, today),
        average_processing_days: average_processing_days(cases),
    }
}

/// Per-handler totals with ongoing/completed sub-counts and completion rate.
fn handler_breakdown(cases: &[VehicleCase]) -> Vec<HandlerStats> {
    let mut counts: BTreeMap<Uuid, (i64, i64)> = BTreeMap::new();
    for case in cases {
        let Some(handler) = case.handler_user_id else {
            continue;
        };
        let entry = counts.entry(handler).or_insert((0, 0));
        entry.0 += 1;
        if !case.is_ongoing() {
            entry.1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(handler_user_id, (total, completed))| HandlerStats {
            handler_user_id,
            total,
            ongoing: total - completed,
            completed,
            completion_rate: completion_rate(completed, total),
        })
        .collect()
}

/// `completed / total` as a rounded percentage; 0 when total is 0.
fn completion_rate(completed: i64, total: i64) -> i64 {
    if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as i64
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday of the ISO week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// The last `DAILY_BUCKETS` weekdays ending at (or before) `today`, oldest
/// first; weekends are excluded entirely.
fn last_weekdays(today: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(DAILY_BUCKETS);
    let mut cursor = today;
    while days.len() < DAILY_BUCKETS {
        if is_weekday(cursor) {
            days.push(cursor);
        }
        cursor = cursor - Days::new(1);
    }
    days.reverse();
    days
}

fn daily_series(cases: &[VehicleCase], today: NaiveDate) -> Vec<TimeBucket> {
    let days = last_weekdays(today);
    let mut buckets: BTreeMap<NaiveDate, i64> = days.iter().map(|d| (*d, 0)).collect();

    for case in cases {
        let created = case.created_at.date_naive();
        if let Some(count) = buckets.get_mut(&created) {
            *count += 1;
        }
    }

    days.into_iter()
        .map(|d| TimeBucket {
            key: d.format("%Y-%m-%d").to_string(),
            count: buckets[&d],
        })
        .collect()
}

fn weekly_series(cases: &[VehicleCase], today: NaiveDate) -> Vec<TimeBucket> {
    let current_week = week_start(today);
    let mut weeks: Vec<NaiveDate> = (0..WEEKLY_BUCKETS)
        .map(|i| current_week - Days::new(7 * i as u64))
        .collect();
    weeks.reverse();

    let mut buckets: BTreeMap<NaiveDate, i64> = weeks.iter().map(|w| (*w, 0)).collect();

    for case in cases {
        let created = case.created_at.date_naive();
        // Weekend creations are excluded from the weekly counts as well.
        if !is_weekday(created) {
            continue;
        }
        if let Some(count) = buckets.get_mut(&week_start(created)) {
            *count += 1;
        }
    }

    weeks
        .into_iter()
        .map(|w| TimeBucket {
            key: w.format("%Y-%m-%d").to_string(),
            count: buckets[&w],
        })
        .collect()
}

fn monthly_series(cases: &[VehicleCase], today: NaiveDate) -> Vec<TimeBucket> {
    let mut months = Vec::with_capacity(MONTHLY_BUCKETS);
    let mut year = today.year();
    let mut month = today.month();
    for _ in 0..MONTHLY_BUCKETS {
        months.push((year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    months.reverse();

    let mut buckets: BTreeMap<(i32, u32), i64> = months.iter().map(|m| (*m, 0)).collect();

    for case in cases {
        let created = case.created_at.date_naive();
        if let Some(count) = buckets.get_mut(&(created.year(), created.month())) {
            *count += 1;
        }
    }

    months
        .into_iter()
        .map(|(y, m)| TimeBucket {
            key: format!("{:04}-{:02}", y, m),
            count: buckets[&(y, m)],
        })
        .collect()
}

/// Whole-day processing time averaged over completed cases, rounded to the
/// nearest day. None when no case is both klar and archived.
fn average_processing_days(cases: &[VehicleCase]) -> Option<i64> {
    let durations: Vec<i64> = cases
        .iter()
        .filter(|c| c.klar)
        .filter_map(|c| {
            c.archived_at
                .map(|archived| (archived.date_naive() - c.created_at.date_naive()).num_days())
        })
        .collect();

    if durations.is_empty() {
        return None;
    }

    let sum: i64 = durations.iter().sum();
    Some((sum as f64 / durations.len() as f64).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn case_created(created_at: DateTime<Utc>) -> VehicleCase {
        VehicleCase {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            registration_number: "ABC123".to_string(),
            dropoff_location_id: Uuid::new_v4(),
            funding_source: FundingSource::Insurance,
            insurance_status: InsuranceStatus::Pending,
            photo_inspection_done: false,
            raknad_pa: false,
            handler_user_id: None,
            handler_note: None,
            klar: false,
            archived_at: None,
            archived_by: None,
            created_at,
            updated_at: created_at,
            created_by: Uuid::new_v4(),
            updated_by: Uuid::new_v4(),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    // 2026-08-21 is a Friday.
    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 21).unwrap()
    }

    #[test]
    fn test_empty_series_are_zero_filled() {
        let stats = compute_statistics(&[], friday(), false);

        assert_eq!(stats.by_day.len(), 30);
        assert_eq!(stats.by_week.len(), 12);
        assert_eq!(stats.by_month.len(), 12);
        assert!(stats.by_day.iter().all(|b| b.count == 0));
        assert!(stats.by_week.iter().all(|b| b.count == 0));
        assert!(stats.by_month.iter().all(|b| b.count == 0));
        assert_eq!(stats.total, 0);
        assert!(stats.average_processing_days.is_none());
    }

    #[test]
    fn test_week_keys_are_monday_aligned() {
        let stats = compute_statistics(&[], friday(), false);

        for bucket in &stats.by_week {
            let date = NaiveDate::parse_from_str(&bucket.key, "%Y-%m-%d").unwrap();
            assert_eq!(date.weekday(), Weekday::Mon, "key {} not a Monday", bucket.key);
        }
        // Last bucket is the current week.
        assert_eq!(stats.by_week.last().unwrap().key, "2026-08-17");
    }

    #[test]
    fn test_daily_buckets_exclude_weekends() {
        let stats = compute_statistics(&[], friday(), false);

        for bucket in &stats.by_day {
            let date = NaiveDate::parse_from_str(&bucket.key, "%Y-%m-%d").unwrap();
            assert!(is_weekday(date), "bucket {} falls on a weekend", bucket.key);
        }
        assert_eq!(stats.by_day.last().unwrap().key, "2026-08-21");
    }

    #[test]
    fn test_weekend_creation_not_counted_in_day_or_week_series() {
        // 2026-08-16 is a Sunday.
        let cases = vec![case_created(at(2026, 8, 16))];
        let stats = compute_statistics(&cases, friday(), false);

        assert!(stats.by_day.iter().all(|b| b.count == 0));
        assert!(stats.by_week.iter().all(|b| b.count == 0));
        // The monthly series still counts it.
        let august = stats.by_month.iter().find(|b| b.key == "2026-08").unwrap();
        assert_eq!(august.count, 1);
    }

    #[test]
    fn test_weekday_creation_lands_in_all_series() {
        // 2026-08-18 is a Tuesday in the week starting 2026-08-17.
        let cases = vec![case_created(at(2026, 8, 18)), case_created(at(2026, 8, 18))];
        let stats = compute_statistics(&cases, friday(), false);

        let day = stats.by_day.iter().find(|b| b.key == "2026-08-18").unwrap();
        assert_eq!(day.count, 2);

        let week = stats.by_week.iter().find(|b| b.key == "2026-08-17").unwrap();
        assert_eq!(week.count, 2);

        let month = stats.by_month.iter().find(|b| b.key == "2026-08").unwrap();
        assert_eq!(month.count, 2);
    }

    #[test]
    fn test_monthly_series_spans_twelve_months() {
        let stats = compute_statistics(&[], friday(), false);
        assert_eq!(stats.by_month.first().unwrap().key, "2025-09");
        assert_eq!(stats.by_month.last().unwrap().key, "2026-08");
    }

    #[test]
    fn test_funding_and_insurance_buckets() {
        let mut internal = case_created(at(2026, 8, 18));
        internal.funding_source = FundingSource::Internal;
        internal.insurance_status = InsuranceStatus::Approved;

        let cases = vec![case_created(at(2026, 8, 18)), internal];
        let stats = compute_statistics(&cases, friday(), false);

        assert_eq!(stats.by_funding_source.insurance, 1);
        assert_eq!(stats.by_funding_source.internal, 1);
        assert_eq!(stats.by_funding_source.customer, 0);
        assert_eq!(stats.by_insurance_status.pending, 1);
        assert_eq!(stats.by_insurance_status.approved, 1);
    }

    #[test]
    fn test_handler_breakdown_and_completion_rate() {
        let handler = Uuid::new_v4();

        let mut done = case_created(at(2026, 8, 17));
        done.handler_user_id = Some(handler);
        done.klar = true;
        done.archived_at = Some(at(2026, 8, 19));

        let mut open_a = case_created(at(2026, 8, 18));
        open_a.handler_user_id = Some(handler);
        let mut open_b = case_created(at(2026, 8, 18));
        open_b.handler_user_id = Some(handler);

        let stats = compute_statistics(&[done, open_a, open_b], friday(), false);
        let breakdown = stats.per_handler.unwrap();
        assert_eq!(breakdown.len(), 1);

        let row = &breakdown[0];
        assert_eq!(row.handler_user_id, handler);
        assert_eq!(row.total, 3);
        assert_eq!(row.ongoing, 2);
        assert_eq!(row.completed, 1);
        // 1/3 rounds to 33 percent.
        assert_eq!(row.completion_rate, 33);
    }

    #[test]
    fn test_handler_scoped_omits_breakdown() {
        let stats = compute_statistics(&[], friday(), true);
        assert!(stats.per_handler.is_none());
    }

    #[test]
    fn test_average_processing_days() {
        let mut fast = case_created(at(2026, 8, 10));
        fast.klar = true;
        fast.archived_at = Some(at(2026, 8, 12)); // 2 days

        let mut slow = case_created(at(2026, 8, 3));
        slow.klar = true;
        slow.archived_at = Some(at(2026, 8, 10)); // 7 days

        let stats = compute_statistics(&[fast, slow], friday(), false);
        // (2 + 7) / 2 = 4.5, rounds to 5.
        assert_eq!(stats.average_processing_days, Some(5));
    }

    #[test]
    fn test_average_ignores_unfinished_cases() {
        let ongoing = case_created(at(2026, 8, 10));
        let stats = compute_statistics(&[ongoing], friday(), false);
        assert!(stats.average_processing_days.is_none());
    }

    #[test]
    fn test_ongoing_archived_partition_counts() {
        let mut archived = case_created(at(2026, 8, 10));
        archived.klar = true;
        archived.archived_at = Some(at(2026, 8, 12));

        let stats = compute_statistics(&[archived, case_created(at(2026, 8, 11))], friday(), false);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.ongoing, 1);
        assert_eq!(stats.archived, 1);
    }

    #[test]
    fn test_completion_rate_zero_total() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 2), 50);
    }
}
