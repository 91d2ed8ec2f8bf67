use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::payment::SubscriptionPlan;
use crate::utils::validation::validate_payment_intent_id;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIntentPayload {
    #[validate(length(min = 1))]
    pub plan: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentResponse {
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    pub plan: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmPaymentPayload {
    #[validate(custom(function = "validate_payment_intent_id"))]
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan: String,
    pub amount: i64,
    pub currency: String,
    pub duration_days: i64,
}

impl From<SubscriptionPlan> for PlanResponse {
    fn from(plan: SubscriptionPlan) -> Self {
        Self {
            plan: plan.as_str().to_string(),
            amount: plan.amount(),
            currency: plan.currency().to_string(),
            duration_days: plan.duration().num_days(),
        }
    }
}
