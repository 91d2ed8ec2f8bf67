use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::User;

/// The caller's own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub is_verified: bool,
    pub subscription: SubscriptionInfo,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub plan: Option<String>,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// What other users may see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub headline: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    #[validate(length(max = 50))]
    pub skills: Option<Vec<String>>,
    #[validate(length(max = 120))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub role: Option<String>,
    pub search: Option<String>,
}

impl From<User> for UserProfile {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            phone: value.phone,
            headline: value.headline,
            bio: value.bio,
            skills: value.skills,
            location: value.location,
            resume_url: value.resume_url,
            photo_url: value.photo_url,
            is_verified: value.is_verified,
            subscription: SubscriptionInfo {
                plan: value.subscription_plan,
                status: value.subscription_status,
                started_at: value.subscription_started_at,
                expires_at: value.subscription_expires_at,
            },
            created_at: value.created_at,
        }
    }
}

impl From<User> for PublicProfile {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            role: value.role,
            headline: value.headline,
            bio: value.bio,
            skills: value.skills,
            location: value.location,
            photo_url: value.photo_url,
        }
    }
}
