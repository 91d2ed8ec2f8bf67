use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::payment_dto::{CreateIntentResponse, PlanResponse};
use crate::error::{Error, Result};
use crate::models::notification::{CreateNotification, NotificationKind};
use crate::models::payment::{subscription_window, Payment, SubscriptionPlan};
use crate::services::notification_service::NotificationService;
use crate::utils::signature::verify_stripe_signature;
use crate::utils::validation::is_payment_intent_id;

const STRIPE_API: &str = "https://api.stripe.com/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent>;

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent>;
}

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    secret_key: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key,
        }
    }

    fn key(&self) -> Result<&str> {
        self.secret_key
            .as_deref()
            .ok_or_else(|| Error::ServiceUnavailable("Payments are not configured".into()))
    }

    async fn parse(resp: reqwest::Response) -> Result<PaymentIntent> {
        let status = resp.status();
        let body: JsonValue = resp.json().await?;
        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            tracing::warn!(%status, %message, "stripe request failed");
            if status.is_client_error() {
                return Err(Error::BadRequest(format!("Payment provider rejected the request: {}", message)));
            }
            return Err(Error::Upstream(message));
        }
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent> {
        let key = self.key()?;
        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), amount.to_string()),
            ("currency".into(), currency.to_string()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
        ];
        form.extend(metadata.into_iter().map(|(k, v)| (format!("metadata[{}]", k), v)));

        let resp = self
            .client
            .post(format!("{}/payment_intents", STRIPE_API))
            .bearer_auth(key)
            .form(&form)
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        let key = self.key()?;
        let resp = self
            .client
            .get(format!("{}/payment_intents/{}", STRIPE_API, intent_id))
            .bearer_auth(key)
            .send()
            .await?;
        Self::parse(resp).await
    }
}

/// Checks that a provider-side intent is a finished purchase made by `user_id`
/// and returns the plan it paid for.
pub fn verified_purchase(intent: &PaymentIntent, user_id: Uuid) -> Result<SubscriptionPlan> {
    if intent.status != "succeeded" {
        return Err(Error::BadRequest(format!(
            "Payment has not succeeded (status: {})",
            intent.status
        )));
    }
    let owner = intent.metadata.get("user_id").map(String::as_str);
    if owner != Some(user_id.to_string().as_str()) {
        return Err(Error::Forbidden("Payment belongs to another user".into()));
    }
    let plan: SubscriptionPlan = intent
        .metadata
        .get("plan")
        .ok_or_else(|| Error::BadRequest("Payment has no plan attached".into()))?
        .parse()
        .map_err(Error::BadRequest)?;
    if intent.amount != plan.amount() || !intent.currency.eq_ignore_ascii_case(plan.currency()) {
        return Err(Error::BadRequest("Payment amount does not match the plan".into()));
    }
    Ok(plan)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmOutcome {
    pub payment: Payment,
    pub plan: String,
    pub subscription_expires_at: Option<chrono::DateTime<Utc>>,
    /// False when the intent had already been applied.
    pub applied: bool,
}

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    notifications: NotificationService,
    webhook_secret: Option<String>,
}

impl PaymentService {
    pub fn new(
        pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
        notifications: NotificationService,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            pool,
            gateway,
            notifications,
            webhook_secret,
        }
    }

    pub fn plans() -> Vec<PlanResponse> {
        SubscriptionPlan::ALL.into_iter().map(PlanResponse::from).collect()
    }

    pub async fn create_intent(&self, user_id: Uuid, plan: &str) -> Result<CreateIntentResponse> {
        let plan: SubscriptionPlan = plan.parse().map_err(Error::BadRequest)?;
        let metadata = HashMap::from([
            ("user_id".to_string(), user_id.to_string()),
            ("plan".to_string(), plan.as_str().to_string()),
        ]);
        let intent = self
            .gateway
            .create_intent(plan.amount(), plan.currency(), metadata)
            .await?;
        let client_secret = intent
            .client_secret
            .clone()
            .ok_or_else(|| Error::Upstream("Payment intent has no client secret".into()))?;

        tracing::info!(%user_id, intent_id = %intent.id, plan = plan.as_str(), "payment intent created");
        Ok(CreateIntentResponse {
            payment_intent_id: intent.id,
            client_secret,
            amount: intent.amount,
            currency: intent.currency,
            plan: plan.as_str().to_string(),
        })
    }

    pub async fn confirm(&self, user_id: Uuid, intent_id: &str) -> Result<ConfirmOutcome> {
        if !is_payment_intent_id(intent_id) {
            return Err(Error::BadRequest("Invalid payment intent id".into()));
        }
        let intent = self.gateway.retrieve_intent(intent_id).await?;
        let plan = verified_purchase(&intent, user_id)?;
        self.apply_purchase(user_id, plan, &intent).await
    }

    /// Records the payment and extends the subscription once per intent.
    async fn apply_purchase(
        &self,
        user_id: Uuid,
        plan: SubscriptionPlan,
        intent: &PaymentIntent,
    ) -> Result<ConfirmOutcome> {
        let mut tx = self.pool.begin().await?;

        // The user row lock serialises concurrent confirms for the same
        // buyer, including the first one when no payment row exists yet.
        let current_expiry: Option<chrono::DateTime<Utc>> = sqlx::query_scalar(
            "SELECT subscription_expires_at FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;

        let previous: Option<String> = sqlx::query_scalar(
            "SELECT status FROM payments WHERE stripe_payment_intent_id = $1 FOR UPDATE",
        )
        .bind(&intent.id)
        .fetch_optional(&mut *tx)
        .await?;
        let already_applied = previous.as_deref() == Some("succeeded");

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (user_id, stripe_payment_intent_id, amount, currency, plan, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (stripe_payment_intent_id)
            DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&intent.id)
        .bind(intent.amount)
        .bind(intent.currency.to_lowercase())
        .bind(plan.as_str())
        .bind(&intent.status)
        .fetch_one(&mut *tx)
        .await?;

        if already_applied {
            tx.commit().await?;
            return Ok(ConfirmOutcome {
                payment,
                plan: plan.as_str().to_string(),
                subscription_expires_at: current_expiry,
                applied: false,
            });
        }

        let (starts_at, expires_at) = subscription_window(plan, current_expiry, Utc::now());
        sqlx::query(
            r#"
            UPDATE users
            SET subscription_plan = $2, subscription_status = 'active',
                subscription_started_at = $3, subscription_expires_at = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(plan.as_str())
        .bind(starts_at)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(%user_id, intent_id = %intent.id, plan = plan.as_str(), %expires_at, "subscription extended");
        self.notifications
            .notify(CreateNotification {
                recipient_id: user_id,
                kind: NotificationKind::PaymentSucceeded,
                title: "Payment received".into(),
                body: format!(
                    "Your {} plan is active until {}",
                    plan.as_str(),
                    expires_at.format("%Y-%m-%d")
                ),
                link: Some("/billing".into()),
            })
            .await;

        Ok(ConfirmOutcome {
            payment,
            plan: plan.as_str().to_string(),
            subscription_expires_at: Some(expires_at),
            applied: true,
        })
    }

    /// Handles a signed provider event. Only `payment_intent.succeeded` has an
    /// effect; other event types are acknowledged and ignored.
    pub async fn handle_webhook(&self, payload: &[u8], signature: Option<&str>) -> Result<bool> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or_else(|| Error::ServiceUnavailable("Payment webhooks are not configured".into()))?;
        let signature =
            signature.ok_or_else(|| Error::BadRequest("Missing Stripe-Signature header".into()))?;
        if !verify_stripe_signature(payload, signature, secret, Utc::now().timestamp()) {
            return Err(Error::BadRequest("Invalid webhook signature".into()));
        }

        let event: JsonValue = serde_json::from_slice(payload)?;
        if event["type"].as_str() != Some("payment_intent.succeeded") {
            tracing::debug!(event_type = ?event["type"].as_str(), "ignoring payment event");
            return Ok(false);
        }

        let intent: PaymentIntent = serde_json::from_value(event["data"]["object"].clone())?;
        let user_id = intent
            .metadata
            .get("user_id")
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| Error::BadRequest("Payment intent has no user".into()))?;
        let plan = verified_purchase(&intent, user_id)?;
        let outcome = self.apply_purchase(user_id, plan, &intent).await?;
        Ok(outcome.applied)
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    pub async fn expire_subscriptions(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET subscription_status = 'expired', updated_at = NOW()
            WHERE subscription_status = 'active' AND subscription_expires_at <= NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
