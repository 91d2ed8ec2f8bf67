use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::envelope::{Page, Paginated};
use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobStatus};
use crate::utils::validation::{contains_pattern, normalize_skills};

const JOB_SELECT: &str = r#"
    SELECT j.*, (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.id) AS application_count
    FROM jobs j
"#;

const RETURNING_JOB: &str =
    "RETURNING *, (SELECT COUNT(*) FROM applications a WHERE a.job_id = jobs.id) AS application_count";

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

/// Who is asking, for ownership decisions.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    pub fn can_manage(&self, job: &Job) -> bool {
        self.is_admin || job.employer_id == self.user_id
    }
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: JobListQuery) -> Result<Paginated<Job>> {
        let page = Page::new(query.page, query.per_page);

        let mut filters = vec!["j.status = 'active'".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(search) = non_blank(query.search) {
            let n = args.len() + 1;
            filters.push(format!(
                "(j.title ILIKE ${n} OR j.description ILIKE ${n} OR j.location ILIKE ${n})"
            ));
            args.push(contains_pattern(&search));
        }
        if let Some(location) = non_blank(query.location) {
            filters.push(format!("j.location ILIKE ${}", args.len() + 1));
            args.push(contains_pattern(&location));
        }
        if let Some(employment_type) = non_blank(query.employment_type) {
            filters.push(format!("LOWER(j.employment_type) = LOWER(${})", args.len() + 1));
            args.push(employment_type);
        }
        if let Some(skill) = non_blank(query.skill) {
            filters.push(format!(
                "EXISTS (SELECT 1 FROM unnest(j.skills) s WHERE LOWER(s) = LOWER(${}))",
                args.len() + 1
            ));
            args.push(skill);
        }
        if let Some(company_id) = query.company_id {
            filters.push(format!("j.company_id::text = ${}", args.len() + 1));
            args.push(company_id.to_string());
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));
        let items_query = format!(
            "{} {} ORDER BY j.created_at DESC LIMIT ${} OFFSET ${}",
            JOB_SELECT,
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs j {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Job>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(Paginated::new(items, total, page))
    }

    pub async fn find(&self, id: Uuid) -> Result<Job> {
        let sql = format!("{} WHERE j.id = $1", JOB_SELECT);
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    /// Public lookup. Jobs that are not active stay hidden from everyone but
    /// their owner and admins.
    pub async fn get(&self, id: Uuid, viewer: Option<Actor>) -> Result<Job> {
        let job = self.find(id).await?;
        let visible = job.status == JobStatus::Active.as_str()
            || viewer.map(|v| v.can_manage(&job)).unwrap_or(false);
        if !visible {
            return Err(Error::NotFound("Job not found".into()));
        }
        Ok(job)
    }

    pub async fn get_managed(&self, id: Uuid, actor: Actor) -> Result<Job> {
        let job = self.find(id).await?;
        if !actor.can_manage(&job) {
            return Err(Error::Forbidden("You do not own this job".into()));
        }
        Ok(job)
    }

    pub async fn create(&self, employer_id: Uuid, payload: CreateJobPayload) -> Result<Job> {
        if let Some(company_id) = payload.company_id {
            self.ensure_company_owner(company_id, employer_id).await?;
        }
        let status = match payload.status.as_deref() {
            Some(raw) => raw.parse::<JobStatus>().map_err(Error::BadRequest)?,
            None => JobStatus::Active,
        };

        let sql = format!(
            r#"
            INSERT INTO jobs (
                employer_id, company_id, title, description, location, employment_type,
                experience_level, salary_min, salary_max, currency, skills, status, deadline
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            {}
            "#,
            RETURNING_JOB
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(employer_id)
            .bind(payload.company_id)
            .bind(payload.title.trim())
            .bind(payload.description.trim())
            .bind(payload.location.trim())
            .bind(payload.employment_type.unwrap_or_else(|| "full-time".to_string()))
            .bind(payload.experience_level)
            .bind(payload.salary_min)
            .bind(payload.salary_max)
            .bind(payload.currency.map(|c| c.to_uppercase()))
            .bind(normalize_skills(&payload.skills))
            .bind(status.as_str())
            .bind(payload.deadline)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(job_id = %job.id, %employer_id, "job created");
        Ok(job)
    }

    pub async fn update(&self, id: Uuid, actor: Actor, payload: UpdateJobPayload) -> Result<Job> {
        let existing = self.get_managed(id, actor).await?;

        if let Some(company_id) = payload.company_id {
            self.ensure_company_owner(company_id, existing.employer_id).await?;
        }
        let salary_min = payload.salary_min.or(existing.salary_min);
        let salary_max = payload.salary_max.or(existing.salary_max);
        if let (Some(min), Some(max)) = (salary_min, salary_max) {
            if min > max {
                return Err(Error::BadRequest("salary_min must not exceed salary_max".into()));
            }
        }
        let status = payload
            .status
            .as_deref()
            .map(|raw| raw.parse::<JobStatus>().map_err(Error::BadRequest))
            .transpose()?;

        let sql = format!(
            r#"
            UPDATE jobs SET
                company_id = COALESCE($2, company_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                employment_type = COALESCE($6, employment_type),
                experience_level = COALESCE($7, experience_level),
                salary_min = COALESCE($8, salary_min),
                salary_max = COALESCE($9, salary_max),
                currency = COALESCE($10, currency),
                skills = COALESCE($11, skills),
                status = COALESCE($12, status),
                deadline = COALESCE($13, deadline),
                updated_at = NOW()
            WHERE id = $1
            {}
            "#,
            RETURNING_JOB
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(payload.company_id)
            .bind(payload.title.as_deref().map(str::trim))
            .bind(payload.description.as_deref().map(str::trim))
            .bind(payload.location.as_deref().map(str::trim))
            .bind(payload.employment_type)
            .bind(payload.experience_level)
            .bind(payload.salary_min)
            .bind(payload.salary_max)
            .bind(payload.currency.map(|c| c.to_uppercase()))
            .bind(payload.skills.as_deref().map(normalize_skills))
            .bind(status.map(|s| s.as_str()))
            .bind(payload.deadline)
            .fetch_one(&self.pool)
            .await?;

        Ok(job)
    }

    pub async fn set_status(&self, id: Uuid, actor: Actor, status: &str) -> Result<Job> {
        let status: JobStatus = status.parse().map_err(Error::BadRequest)?;
        self.get_managed(id, actor).await?;

        let sql = format!(
            "UPDATE jobs SET status = $2, updated_at = NOW() WHERE id = $1 {}",
            RETURNING_JOB
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(job_id = %id, status = status.as_str(), "job status changed");
        Ok(job)
    }

    pub async fn delete(&self, id: Uuid, actor: Actor) -> Result<()> {
        self.get_managed(id, actor).await?;
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(job_id = %id, "job deleted");
        Ok(())
    }

    pub async fn mine(&self, employer_id: Uuid) -> Result<Vec<Job>> {
        let sql = format!("{} WHERE j.employer_id = $1 ORDER BY j.created_at DESC", JOB_SELECT);
        let jobs = sqlx::query_as::<_, Job>(&sql)
            .bind(employer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    /// Active jobs still accepting applications, newest first.
    pub async fn list_open(&self, limit: i64) -> Result<Vec<Job>> {
        let limit = if limit <= 0 { 200 } else { limit.min(500) };
        let sql = format!(
            "{} WHERE j.status = 'active' AND (j.deadline IS NULL OR j.deadline > $1) ORDER BY j.created_at DESC LIMIT $2",
            JOB_SELECT
        );
        let jobs = sqlx::query_as::<_, Job>(&sql)
            .bind(Utc::now())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn ensure_company_owner(&self, company_id: Uuid, employer_id: Uuid) -> Result<()> {
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT employer_id FROM companies WHERE id = $1")
                .bind(company_id)
                .fetch_optional(&self.pool)
                .await?;
        match owner {
            None => Err(Error::NotFound("Company not found".into())),
            Some(owner) if owner != employer_id => {
                Err(Error::Forbidden("Company belongs to another employer".into()))
            }
            Some(_) => Ok(()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
