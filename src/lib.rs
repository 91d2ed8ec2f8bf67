pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::{
    analytics_service::AnalyticsService,
    application_service::ApplicationService,
    auth_service::AuthService,
    certificate_service::CertificateService,
    company_service::CompanyService,
    email_service::{Mailer, WebhookMailer},
    external_job_service::ExternalJobService,
    import_service::ImportService,
    job_service::JobService,
    message_service::MessageService,
    notification_service::NotificationService,
    payment_service::{PaymentGateway, PaymentService, StripeGateway},
    realtime_service::RealtimeHub,
    student_service::StudentService,
    user_service::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub realtime: RealtimeHub,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub company_service: CompanyService,
    pub student_service: StudentService,
    pub import_service: ImportService,
    pub certificate_service: CertificateService,
    pub payment_service: PaymentService,
    pub notification_service: NotificationService,
    pub message_service: MessageService,
    pub analytics_service: AnalyticsService,
    pub external_job_service: ExternalJobService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let mailer = Arc::new(WebhookMailer::new(
            config.mail_webhook_url.clone(),
            config.mail_from.clone(),
        ));
        let gateway = Arc::new(StripeGateway::new(config.stripe_secret_key.clone()));
        Self::with_adapters(pool, mailer, gateway)
    }

    /// Builds the state around the given mail and payment adapters.
    pub fn with_adapters(
        pool: PgPool,
        mailer: Arc<dyn Mailer>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let config = crate::config::get_config();
        let realtime = RealtimeHub::new();

        let notification_service = NotificationService::new(pool.clone(), realtime.clone());
        let user_service = UserService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let student_service = StudentService::new(pool.clone());

        Self {
            auth_service: AuthService::new(pool.clone(), mailer, config.otp_ttl_minutes),
            application_service: ApplicationService::new(
                pool.clone(),
                job_service.clone(),
                user_service.clone(),
                notification_service.clone(),
            ),
            company_service: CompanyService::new(pool.clone(), config.max_companies_per_employer),
            import_service: ImportService::new(student_service.clone()),
            certificate_service: CertificateService::new(
                student_service.clone(),
                notification_service.clone(),
                config.uploads_dir.clone(),
                config.chrome_bin.clone(),
            ),
            payment_service: PaymentService::new(
                pool.clone(),
                gateway,
                notification_service.clone(),
                config.stripe_webhook_secret.clone(),
            ),
            message_service: MessageService::new(pool.clone(), realtime.clone()),
            analytics_service: AnalyticsService::new(pool.clone()),
            external_job_service: ExternalJobService::new(config.jooble_api_key.clone()),
            user_service,
            job_service,
            student_service,
            notification_service,
            realtime,
            pool,
        }
    }
}
