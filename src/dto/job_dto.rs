use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::job::Job;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_salary"))]
pub struct CreateJobPayload {
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 120))]
    pub location: String,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub skills: Vec<String>,
    pub status: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, ToSchema)]
#[validate(schema(function = "validate_update_salary"))]
pub struct UpdateJobPayload {
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(max = 50))]
    pub skills: Option<Vec<String>>,
    pub status: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct JobStatusPayload {
    pub status: String,
}

fn check_salary_range(min: Option<Decimal>, max: Option<Decimal>) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            let mut err = ValidationError::new("salary_range");
            err.message = Some("salary_min must not exceed salary_max".into());
            return Err(err);
        }
    }
    if min.map(|m| m.is_sign_negative()).unwrap_or(false)
        || max.map(|m| m.is_sign_negative()).unwrap_or(false)
    {
        let mut err = ValidationError::new("salary_negative");
        err.message = Some("salary must not be negative".into());
        return Err(err);
    }
    Ok(())
}

fn validate_create_salary(payload: &CreateJobPayload) -> Result<(), ValidationError> {
    check_salary_range(payload.salary_min, payload.salary_max)
}

fn validate_update_salary(payload: &UpdateJobPayload) -> Result<(), ValidationError> {
    check_salary_range(payload.salary_min, payload.salary_max)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub company_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub employment_type: String,
    pub experience_level: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub currency: Option<String>,
    pub skills: Vec<String>,
    pub status: String,
    pub deadline: Option<DateTime<Utc>>,
    pub application_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub skill: Option<String>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct ExternalJobQuery {
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExternalJob {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub snippet: Option<String>,
    pub link: String,
    pub updated: Option<String>,
    pub source: String,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            employer_id: value.employer_id,
            company_id: value.company_id,
            title: value.title,
            description: value.description,
            location: value.location,
            employment_type: value.employment_type,
            experience_level: value.experience_level,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            currency: value.currency,
            skills: value.skills,
            status: value.status,
            deadline: value.deadline,
            application_count: value.application_count,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
