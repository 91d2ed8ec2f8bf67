pub mod ai;
pub mod analytics;
pub mod applications;
pub mod auth;
pub mod cert;
pub mod companies;
pub mod docs;
pub mod health;
pub mod jobs;
pub mod messages;
pub mod notifications;
pub mod payment;
pub mod realtime;
pub mod students;
pub mod users;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
    Router,
};

use crate::{
    config::get_config,
    error::Result,
    middleware::{
        auth::{require_admin, require_applicant, require_auth, require_employer, Claims},
        rate_limit::{new_rps_state, rps_middleware},
    },
    services::job_service::Actor,
    AppState,
};

pub fn actor_of(claims: &Claims) -> Result<Actor> {
    Ok(Actor {
        user_id: claims.user_id()?,
        is_admin: claims.is_admin(),
    })
}

/// All API routes with their role gates and rate limits. Static files, CORS
/// and tracing are layered on by the binary.
pub fn build_router(state: AppState) -> Router {
    let config = get_config();

    let auth_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route("/api/auth/resend-otp", post(auth::resend_otp))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .layer(from_fn_with_state(new_rps_state(config.auth_rps), rps_middleware));

    let public_api = Router::new()
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/external", get(jobs::external_jobs))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/users/:id/public", get(users::public_profile))
        .route("/api/cert/verify/:certificate_id", get(cert::verify))
        .route("/api/cert/download/:certificate_id", get(cert::download))
        .route("/api/payment/plans", get(payment::plans))
        .route("/api/payment/webhook", post(payment::webhook))
        .route("/api/realtime/ws", get(realtime::socket))
        .route("/api/docs/openapi.json", get(docs::openapi_json));

    let member_api = Router::new()
        .route("/api/users/me", get(users::me).patch(users::update_me))
        .route("/api/users/me/resume", post(users::upload_resume))
        .route("/api/users/me/photo", post(users::upload_photo))
        .route("/api/applications/:id", get(applications::get_application))
        .route("/api/payment/create-intent", post(payment::create_intent))
        .route("/api/payment/confirm", post(payment::confirm))
        .route("/api/payment/history", get(payment::history))
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/unread-count", get(notifications::unread_count))
        .route("/api/notifications/read-all", patch(notifications::mark_all_read))
        .route("/api/notifications/:id/read", patch(notifications::mark_read))
        .route("/api/notifications/:id", delete(notifications::delete))
        .route("/api/messages", post(messages::send))
        .route("/api/messages/conversations", get(messages::conversations))
        .route("/api/messages/unread-count", get(messages::unread_count))
        .route("/api/messages/:user_id", get(messages::conversation))
        .route("/api/ai/fit-score/:job_id", get(ai::fit_score))
        .route("/api/ai/recommendations", get(ai::recommendations))
        .route_layer(from_fn(require_auth));

    let applicant_api = Router::new()
        .route("/api/jobs/:id/apply", post(applications::apply))
        .route("/api/applications/mine", get(applications::my_applications))
        .route("/api/applications/:id", delete(applications::withdraw))
        .route_layer(from_fn(require_applicant));

    let employer_api = Router::new()
        .route("/api/jobs", post(jobs::create_job))
        .route("/api/jobs/mine", get(jobs::my_jobs))
        .route(
            "/api/jobs/:id",
            patch(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/api/jobs/:id/status", patch(jobs::set_job_status))
        .route("/api/applications/job/:job_id", get(applications::list_for_job))
        .route(
            "/api/applications/job/:job_id/export",
            get(applications::export_for_job),
        )
        .route("/api/applications/:id/status", patch(applications::update_status))
        .route(
            "/api/companies",
            get(companies::my_companies).post(companies::create_company),
        )
        .route(
            "/api/companies/:id",
            get(companies::get_company)
                .patch(companies::update_company)
                .delete(companies::delete_company),
        )
        .route(
            "/api/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/api/students/import", post(students::import_students))
        .route("/api/students/template", get(students::import_template))
        .route("/api/students/:id", delete(students::delete_student))
        .route("/api/cert/generate/:student_id", post(cert::generate))
        .route("/api/analytics/employer", get(analytics::employer))
        .route_layer(from_fn(require_employer));

    let admin_api = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/analytics/admin", get(analytics::admin))
        .route_layer(from_fn(require_admin));

    let api = public_api
        .merge(member_api)
        .merge(applicant_api)
        .merge(employer_api)
        .merge(admin_api)
        .layer(from_fn_with_state(new_rps_state(config.api_rps), rps_middleware));

    Router::new()
        .route("/health", get(health::health))
        .merge(auth_api)
        .merge(api)
        .with_state(state)
}
