//! Invariants that only a real Postgres can show. Each test returns early
//! unless TEST_DATABASE_URL points at a scratch database.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use rust_xlsxwriter::Workbook;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use common::{db_pool, get_request, insert_user, json_request, send_to, token_as};
use jobboard_backend::{
    dto::{
        application_dto::{ApplyPayload, UpdateApplicationStatusPayload},
        company_dto::CreateCompanyPayload,
        job_dto::{CreateJobPayload, UpdateJobPayload},
    },
    error::{Error, Result},
    models::{job::Job, student::NewStudent},
    routes::build_router,
    services::{
        application_service::ApplicationService,
        company_service::CompanyService,
        email_service::WebhookMailer,
        import_service::ImportService,
        job_service::{Actor, JobService},
        notification_service::NotificationService,
        payment_service::{PaymentGateway, PaymentIntent, PaymentService},
        realtime_service::RealtimeHub,
        student_service::StudentService,
        user_service::UserService,
    },
    AppState,
};

/// Hands back a succeeded basic-plan intent for one buyer.
struct SucceededGateway {
    buyer: Uuid,
}

#[async_trait]
impl PaymentGateway for SucceededGateway {
    async fn create_intent(
        &self,
        _amount: i64,
        _currency: &str,
        _metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent> {
        Err(Error::ServiceUnavailable("not used".into()))
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        Ok(PaymentIntent {
            id: intent_id.to_string(),
            client_secret: None,
            amount: 999,
            currency: "usd".into(),
            status: "succeeded".into(),
            metadata: HashMap::from([
                ("user_id".to_string(), self.buyer.to_string()),
                ("plan".to_string(), "basic".to_string()),
            ]),
        })
    }
}

fn employer(user_id: Uuid) -> Actor {
    Actor {
        user_id,
        is_admin: false,
    }
}

fn job_payload(status: Option<&str>) -> CreateJobPayload {
    CreateJobPayload {
        company_id: None,
        title: "Backend Engineer".into(),
        description: "Build the job board".into(),
        location: "Remote".into(),
        employment_type: None,
        experience_level: None,
        salary_min: None,
        salary_max: None,
        currency: None,
        skills: vec!["Rust".into()],
        status: status.map(str::to_string),
        deadline: None,
    }
}

fn company_payload(email: &str) -> CreateCompanyPayload {
    CreateCompanyPayload {
        name: "Acme".into(),
        email: email.into(),
        website: None,
        industry: None,
        size: None,
        location: None,
        description: None,
        logo_url: None,
    }
}

fn applications(pool: &PgPool) -> ApplicationService {
    ApplicationService::new(
        pool.clone(),
        JobService::new(pool.clone()),
        UserService::new(pool.clone()),
        NotificationService::new(pool.clone(), RealtimeHub::new()),
    )
}

async fn active_job(pool: &PgPool, owner: Uuid) -> Job {
    JobService::new(pool.clone())
        .create(owner, job_payload(None))
        .await
        .expect("create job")
}

#[tokio::test]
async fn only_the_owner_changes_a_job() {
    let Some(pool) = db_pool().await else { return };
    let owner = insert_user(&pool, "employer").await;
    let rival = insert_user(&pool, "employer").await;
    let jobs = JobService::new(pool.clone());
    let job = active_job(&pool, owner).await;

    let update = UpdateJobPayload {
        title: Some("Hijacked".into()),
        ..Default::default()
    };
    let err = jobs.update(job.id, employer(rival), update).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    let err = jobs.delete(job.id, employer(rival)).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let admin = Actor {
        user_id: rival,
        is_admin: true,
    };
    let update = UpdateJobPayload {
        title: Some("Moderated".into()),
        ..Default::default()
    };
    let moderated = jobs.update(job.id, admin, update).await.expect("admin update");
    assert_eq!(moderated.title, "Moderated");
    assert_eq!(jobs.find(job.id).await.unwrap().employer_id, owner);
}

#[tokio::test]
async fn one_application_per_job_and_applicant() {
    let Some(pool) = db_pool().await else { return };
    let owner = insert_user(&pool, "employer").await;
    let seeker = insert_user(&pool, "seeker").await;
    let job = active_job(&pool, owner).await;
    let service = applications(&pool);

    service
        .apply(job.id, seeker, ApplyPayload::default())
        .await
        .expect("first application");
    let err = service
        .apply(job.id, seeker, ApplyPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(ref m) if m.contains("already applied")));

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications WHERE job_id = $1 AND applicant_id = $2",
    )
    .bind(job.id)
    .bind(seeker)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn withdraw_only_while_pending() {
    let Some(pool) = db_pool().await else { return };
    let owner = insert_user(&pool, "employer").await;
    let seeker = insert_user(&pool, "seeker").await;
    let other_seeker = insert_user(&pool, "seeker").await;
    let job = active_job(&pool, owner).await;
    let service = applications(&pool);

    let reviewed = service
        .apply(job.id, seeker, ApplyPayload::default())
        .await
        .unwrap();
    let err = service.withdraw(reviewed.id, other_seeker).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let rival = insert_user(&pool, "employer").await;
    let err = service
        .update_status(
            reviewed.id,
            employer(rival),
            UpdateApplicationStatusPayload {
                status: "Rejected".into(),
                employer_notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    service
        .update_status(
            reviewed.id,
            employer(owner),
            UpdateApplicationStatusPayload {
                status: "Reviewed".into(),
                employer_notes: None,
            },
        )
        .await
        .unwrap();
    let err = service.withdraw(reviewed.id, seeker).await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    let pending = service
        .apply(job.id, other_seeker, ApplyPayload::default())
        .await
        .unwrap();
    service.withdraw(pending.id, other_seeker).await.expect("withdraw pending");
    let gone: bool = sqlx::query_scalar("SELECT NOT EXISTS (SELECT 1 FROM applications WHERE id = $1)")
        .bind(pending.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(gone);
}

#[tokio::test]
async fn companies_are_capped_and_unique_per_employer() {
    let Some(pool) = db_pool().await else { return };
    let owner = insert_user(&pool, "employer").await;
    let service = CompanyService::new(pool.clone(), 2);

    service.create(owner, company_payload("hr@acme.test")).await.unwrap();
    let err = service
        .create(owner, company_payload("HR@acme.test"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(ref m) if m.contains("already exists")));

    service.create(owner, company_payload("jobs@acme.test")).await.unwrap();
    let err = service
        .create(owner, company_payload("third@acme.test"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    let other = insert_user(&pool, "employer").await;
    service
        .create(other, company_payload("hr@acme.test"))
        .await
        .expect("same email under another employer");
}

#[tokio::test]
async fn import_reports_students_already_enrolled() {
    let Some(pool) = db_pool().await else { return };
    let owner = insert_user(&pool, "employer").await;
    let students = StudentService::new(pool.clone());
    let email = format!("student-{}@example.com", Uuid::new_v4());
    students
        .create(
            owner,
            NewStudent {
                name: "Ana".into(),
                email: email.clone(),
                course: "Rust".into(),
                institution: None,
                grade: None,
                completion_date: None,
            },
        )
        .await
        .unwrap();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["Name", "Email", "Course"].into_iter().enumerate() {
        sheet.write_string(0, col as u16, header).unwrap();
    }
    let rows = [
        ["Ana", email.as_str(), "rust"],
        ["Ana", email.as_str(), "SQL"],
    ];
    for (i, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet.write_string(i as u32 + 1, col as u16, *value).unwrap();
        }
    }
    let bytes = workbook.save_to_buffer().unwrap();

    let report = ImportService::new(students)
        .import(owner, &bytes)
        .await
        .expect("import");
    assert_eq!(report.total_rows, 2);
    assert_eq!(report.inserted, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors[0].row, 2);
    assert!(report.errors[0].errors[0].contains("already enrolled"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_confirms_extend_the_subscription_once() {
    let Some(pool) = db_pool().await else { return };
    let buyer = insert_user(&pool, "seeker").await;
    let service = PaymentService::new(
        pool.clone(),
        Arc::new(SucceededGateway { buyer }),
        NotificationService::new(pool.clone(), RealtimeHub::new()),
        None,
    );
    let intent_id = format!("pi_{}", Uuid::new_v4().simple());

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let service = service.clone();
            let intent_id = intent_id.clone();
            tokio::spawn(async move { service.confirm(buyer, &intent_id).await })
        })
        .collect();
    let mut applied = 0;
    for handle in handles {
        if handle.await.unwrap().expect("confirm").applied {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);

    let again = service.confirm(buyer, &intent_id).await.unwrap();
    assert!(!again.applied);

    let expires: chrono::DateTime<Utc> =
        sqlx::query_scalar("SELECT subscription_expires_at FROM users WHERE id = $1")
            .bind(buyer)
            .fetch_one(&pool)
            .await
            .unwrap();
    let expected = Utc::now() + Duration::days(30);
    assert!((expires - expected).num_minutes().abs() < 5);
}

fn router(pool: PgPool) -> axum::Router {
    let mailer = Arc::new(WebhookMailer::new(None, "noreply@example.com".into()));
    let gateway = Arc::new(SucceededGateway { buyer: Uuid::nil() });
    build_router(AppState::with_adapters(pool, mailer, gateway))
}

#[tokio::test]
async fn fit_score_hides_jobs_that_are_not_public() {
    let Some(pool) = db_pool().await else { return };
    let owner = insert_user(&pool, "employer").await;
    let seeker = insert_user(&pool, "seeker").await;
    let draft = JobService::new(pool.clone())
        .create(owner, job_payload(Some("draft")))
        .await
        .unwrap();
    let uri = format!("/api/ai/fit-score/{}", draft.id);

    let (status, _) = send_to(
        router(pool.clone()),
        get_request(&uri, Some(&token_as(seeker, "seeker"))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_to(
        router(pool.clone()),
        get_request(&uri, Some(&token_as(owner, "employer"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn certificate_for_another_employers_student_is_forbidden() {
    let Some(pool) = db_pool().await else { return };
    let owner = insert_user(&pool, "employer").await;
    let rival = insert_user(&pool, "employer").await;
    let student = StudentService::new(pool.clone())
        .create(
            owner,
            NewStudent {
                name: "Ana".into(),
                email: format!("student-{}@example.com", Uuid::new_v4()),
                course: "Rust".into(),
                institution: None,
                grade: None,
                completion_date: None,
            },
        )
        .await
        .unwrap();
    let uri = format!("/api/cert/generate/{}", student.id);

    let (status, _) = send_to(
        router(pool.clone()),
        json_request("POST", &uri, Some(&token_as(rival, "employer")), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Rendering is unconfigured in tests, so the owner gets past the
    // ownership check and stops there.
    let (status, _) = send_to(
        router(pool),
        json_request("POST", &uri, Some(&token_as(owner, "employer")), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
