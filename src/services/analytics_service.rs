use chrono::{Duration, NaiveDate};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::dto::analytics_dto::{AdminAnalytics, DailyCount, EmployerAnalytics, JobApplicationCount};
use crate::error::Result;
use crate::models::application::ApplicationStatus;
use crate::models::job::JobStatus;
use crate::utils::time::now;

pub const TREND_DAYS: i64 = 30;

#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn employer(&self, employer_id: Uuid) -> Result<EmployerAnalytics> {
        let jobs_by_status: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM jobs WHERE employer_id = $1 GROUP BY status",
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;

        let applications_by_status: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT a.status, COUNT(*)
            FROM applications a JOIN jobs j ON j.id = a.job_id
            WHERE j.employer_id = $1
            GROUP BY a.status
            "#,
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;

        let top_jobs = sqlx::query_as::<_, JobApplicationCount>(
            r#"
            SELECT j.id AS job_id, j.title, j.status, COUNT(a.id) AS applications
            FROM jobs j LEFT JOIN applications a ON a.job_id = j.id
            WHERE j.employer_id = $1
            GROUP BY j.id, j.title, j.status
            ORDER BY applications DESC, j.created_at DESC
            LIMIT 10
            "#,
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;

        let since = (now() - Duration::days(TREND_DAYS - 1)).date_naive();
        let daily: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT (a.created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*)
            FROM applications a JOIN jobs j ON j.id = a.job_id
            WHERE j.employer_id = $1 AND a.created_at >= $2::date
            GROUP BY day
            "#,
        )
        .bind(employer_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let average_fit_score: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT AVG(a.fit_score)::float8
            FROM applications a JOIN jobs j ON j.id = a.job_id
            WHERE j.employer_id = $1
            "#,
        )
        .bind(employer_id)
        .fetch_one(&self.pool)
        .await?;

        let jobs_by_status = with_all_keys(
            jobs_by_status,
            [JobStatus::Active, JobStatus::Closed, JobStatus::Draft].map(|s| s.as_str()),
        );
        let applications_by_status = with_all_keys(
            applications_by_status,
            ApplicationStatus::ALL.map(|s| s.as_str()),
        );

        Ok(EmployerAnalytics {
            total_jobs: jobs_by_status.values().sum(),
            total_applications: applications_by_status.values().sum(),
            jobs_by_status,
            applications_by_status,
            top_jobs,
            applications_last_30_days: fill_daily(since, TREND_DAYS, &daily),
            average_fit_score: average_fit_score.map(|avg| (avg * 10.0).round() / 10.0),
        })
    }

    pub async fn admin(&self) -> Result<AdminAnalytics> {
        let users_by_role: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
                .fetch_all(&self.pool)
                .await?;
        let jobs_by_status: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM jobs GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let total_applications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications")
            .fetch_one(&self.pool)
            .await?;
        let total_revenue: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::bigint FROM payments WHERE status = 'succeeded'",
        )
        .fetch_one(&self.pool)
        .await?;
        let active_subscriptions: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE subscription_status = 'active' AND subscription_expires_at > NOW()",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminAnalytics {
            users_by_role: with_all_keys(users_by_role, ["seeker", "employer", "admin", "student"]),
            jobs_by_status: with_all_keys(
                jobs_by_status,
                [JobStatus::Active, JobStatus::Closed, JobStatus::Draft].map(|s| s.as_str()),
            ),
            total_applications,
            total_revenue,
            active_subscriptions,
        })
    }
}

/// Grouped counts with zero entries for every expected key.
pub fn with_all_keys<const N: usize>(
    rows: Vec<(String, i64)>,
    keys: [&str; N],
) -> HashMap<String, i64> {
    let mut counts: HashMap<String, i64> = keys.iter().map(|k| (k.to_string(), 0)).collect();
    for (key, count) in rows {
        *counts.entry(key).or_insert(0) += count;
    }
    counts
}

/// One entry per day starting at `since`, zero-filled.
pub fn fill_daily(since: NaiveDate, days: i64, rows: &[(NaiveDate, i64)]) -> Vec<DailyCount> {
    let by_day: HashMap<NaiveDate, i64> = rows.iter().copied().collect();
    (0..days)
        .map(|offset| {
            let day = since + Duration::days(offset);
            DailyCount {
                date: day.format("%Y-%m-%d").to_string(),
                count: by_day.get(&day).copied().unwrap_or(0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_series_is_zero_filled() {
        let since = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let rows = vec![(NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(), 4)];
        let series = fill_daily(since, 5, &rows);
        assert_eq!(series.len(), 5);
        assert_eq!(series[0].date, "2026-10-01");
        assert_eq!(series[2].count, 4);
        assert_eq!(series.iter().map(|d| d.count).sum::<i64>(), 4);
    }

    #[test]
    fn missing_statuses_report_zero() {
        let counts = with_all_keys(vec![("active".into(), 3)], ["active", "closed", "draft"]);
        assert_eq!(counts["active"], 3);
        assert_eq!(counts["closed"], 0);
        assert_eq!(counts.len(), 3);
    }
}
