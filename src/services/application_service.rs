use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::{ApplyPayload, UpdateApplicationStatusPayload};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationDetail, ApplicationStatus};
use crate::models::job::Job;
use crate::models::notification::{CreateNotification, NotificationKind};
use crate::models::user::User;
use crate::services::fit_service::FitService;
use crate::services::job_service::{Actor, JobService};
use crate::services::notification_service::NotificationService;
use crate::services::user_service::UserService;

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.job_id, j.title AS job_title, j.employer_id, a.applicant_id,
           u.name AS applicant_name, u.email AS applicant_email, a.status, a.cover_letter,
           a.resume_url, a.profile_snapshot, a.fit_score, a.employer_notes,
           a.created_at, a.updated_at
    FROM applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN users u ON u.id = a.applicant_id
"#;

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    jobs: JobService,
    users: UserService,
    notifications: NotificationService,
}

impl ApplicationService {
    pub fn new(
        pool: PgPool,
        jobs: JobService,
        users: UserService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            pool,
            jobs,
            users,
            notifications,
        }
    }

    pub async fn apply(&self, job_id: Uuid, applicant_id: Uuid, payload: ApplyPayload) -> Result<Application> {
        let job = self.jobs.find(job_id).await?;
        if !job.is_open(Utc::now()) {
            return Err(Error::BadRequest("This job is not accepting applications".into()));
        }

        let already: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE job_id = $1 AND applicant_id = $2)",
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_one(&self.pool)
        .await?;
        if already.0 {
            return Err(Error::BadRequest("You have already applied to this job".into()));
        }

        let applicant = self.users.get(applicant_id).await?;
        let report = FitService::score_for(&applicant, &job);

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (job_id, applicant_id, cover_letter, resume_url, profile_snapshot, fit_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(applicant_id)
        .bind(payload.cover_letter.as_deref().map(str::trim).filter(|c| !c.is_empty()))
        .bind(&applicant.resume_url)
        .bind(profile_snapshot(&applicant))
        .bind(report.score)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(application_id = %application.id, %job_id, fit_score = report.score, "application submitted");

        self.notifications
            .notify(CreateNotification {
                recipient_id: job.employer_id,
                kind: NotificationKind::ApplicationReceived,
                title: "New application".into(),
                body: format!("{} applied to {}", applicant.name, job.title),
                link: Some(format!("/jobs/{}/applications", job.id)),
            })
            .await;

        Ok(application)
    }

    pub async fn mine(&self, applicant_id: Uuid) -> Result<Vec<ApplicationDetail>> {
        let sql = format!("{} WHERE a.applicant_id = $1 ORDER BY a.created_at DESC", DETAIL_SELECT);
        let rows = sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: Uuid, actor: Actor) -> Result<ApplicationDetail> {
        let detail = self.find_detail(id).await?;
        let allowed = actor.is_admin
            || detail.applicant_id == actor.user_id
            || detail.employer_id == actor.user_id;
        if !allowed {
            return Err(Error::Forbidden("You cannot view this application".into()));
        }
        Ok(detail)
    }

    /// Applicants of a job, best fit first.
    pub async fn list_for_job(
        &self,
        job_id: Uuid,
        actor: Actor,
        status: Option<&str>,
    ) -> Result<(Job, Vec<ApplicationDetail>)> {
        let job = self.jobs.get_managed(job_id, actor).await?;
        let status = status
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<ApplicationStatus>().map_err(Error::BadRequest))
            .transpose()?;

        let sql = format!(
            "{} WHERE a.job_id = $1 AND ($2::text IS NULL OR a.status = $2) ORDER BY a.fit_score DESC, a.created_at ASC",
            DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(job_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;
        Ok((job, rows))
    }

    /// Any status may follow any other; the board moves cards freely.
    pub async fn update_status(
        &self,
        id: Uuid,
        actor: Actor,
        payload: UpdateApplicationStatusPayload,
    ) -> Result<Application> {
        let status: ApplicationStatus = payload.status.parse().map_err(Error::BadRequest)?;
        let detail = self.find_detail(id).await?;
        if !(actor.is_admin || detail.employer_id == actor.user_id) {
            return Err(Error::Forbidden("You do not own this job".into()));
        }

        let application = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, employer_notes = COALESCE($3, employer_notes), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(payload.employer_notes)
        .fetch_one(&self.pool)
        .await?;

        if detail.status != application.status {
            self.notifications
                .notify(CreateNotification {
                    recipient_id: detail.applicant_id,
                    kind: NotificationKind::ApplicationStatus,
                    title: "Application updated".into(),
                    body: format!(
                        "Your application for {} is now {}",
                        detail.job_title, application.status
                    ),
                    link: Some(format!("/applications/{}", id)),
                })
                .await;
        }

        Ok(application)
    }

    pub async fn withdraw(&self, id: Uuid, applicant_id: Uuid) -> Result<()> {
        let application = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))?;
        if application.applicant_id != applicant_id {
            return Err(Error::Forbidden("Not your application".into()));
        }
        if application.status != ApplicationStatus::Pending.as_str() {
            return Err(Error::BadRequest("Only pending applications can be withdrawn".into()));
        }

        sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(application_id = %id, "application withdrawn");
        Ok(())
    }

    async fn find_detail(&self, id: Uuid) -> Result<ApplicationDetail> {
        let sql = format!("{} WHERE a.id = $1", DETAIL_SELECT);
        sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))
    }
}

/// Copy of the profile at apply time; later profile edits do not rewrite it.
pub fn profile_snapshot(user: &User) -> JsonValue {
    json!({
        "name": user.name,
        "email": user.email,
        "phone": user.phone,
        "headline": user.headline,
        "bio": user.bio,
        "skills": user.skills,
        "location": user.location,
        "resume_url": user.resume_url,
        "photo_url": user.photo_url,
    })
}
