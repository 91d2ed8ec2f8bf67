use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_payment_intent_id: String,
    pub amount: i64,
    pub currency: String,
    pub plan: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Basic,
    Premium,
    Annual,
}

impl SubscriptionPlan {
    pub const ALL: [SubscriptionPlan; 3] = [
        SubscriptionPlan::Basic,
        SubscriptionPlan::Premium,
        SubscriptionPlan::Annual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Basic => "basic",
            SubscriptionPlan::Premium => "premium",
            SubscriptionPlan::Annual => "annual",
        }
    }

    /// Price in USD cents.
    pub fn amount(&self) -> i64 {
        match self {
            SubscriptionPlan::Basic => 999,
            SubscriptionPlan::Premium => 2999,
            SubscriptionPlan::Annual => 29999,
        }
    }

    pub fn currency(&self) -> &'static str {
        "usd"
    }

    pub fn duration(&self) -> Duration {
        match self {
            SubscriptionPlan::Basic | SubscriptionPlan::Premium => Duration::days(30),
            SubscriptionPlan::Annual => Duration::days(365),
        }
    }
}

impl FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubscriptionPlan::ALL
            .into_iter()
            .find(|plan| plan.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown plan: {}", s))
    }
}

/// Start and end of a subscription window after a purchase. A purchase made
/// while a previous window is still running extends that window.
pub fn subscription_window(
    plan: SubscriptionPlan,
    current_expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let base = current_expiry.filter(|exp| *exp > now).unwrap_or(now);
    (now, base + plan.duration())
}
