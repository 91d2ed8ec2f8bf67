use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::student::NewStudent;
use crate::utils::validation::normalize_email;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudentPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub course: String,
    pub institution: Option<String>,
    pub grade: Option<String>,
    pub completion_date: Option<NaiveDate>,
}

impl From<CreateStudentPayload> for NewStudent {
    fn from(value: CreateStudentPayload) -> Self {
        Self {
            name: value.name.trim().to_string(),
            email: normalize_email(&value.email),
            course: value.course.trim().to_string(),
            institution: value.institution.filter(|v| !v.trim().is_empty()),
            grade: value.grade.filter(|v| !v.trim().is_empty()),
            completion_date: value.completion_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImportReport {
    pub total_rows: usize,
    pub inserted: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}
