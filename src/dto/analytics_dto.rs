use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobApplicationCount {
    pub job_id: Uuid,
    pub title: String,
    pub status: String,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerAnalytics {
    pub total_jobs: i64,
    pub total_applications: i64,
    pub jobs_by_status: HashMap<String, i64>,
    pub applications_by_status: HashMap<String, i64>,
    pub top_jobs: Vec<JobApplicationCount>,
    pub applications_last_30_days: Vec<DailyCount>,
    pub average_fit_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAnalytics {
    pub users_by_role: HashMap<String, i64>,
    pub jobs_by_status: HashMap<String, i64>,
    pub total_applications: i64,
    pub total_revenue: i64,
    pub active_subscriptions: i64,
}
