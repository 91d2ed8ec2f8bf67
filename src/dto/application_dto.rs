use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, Default, ToSchema)]
pub struct ApplyPayload {
    #[validate(length(max = 10000))]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateApplicationStatusPayload {
    pub status: String,
    #[validate(length(max = 5000))]
    pub employer_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
}
