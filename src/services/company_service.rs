use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::company_dto::{CreateCompanyPayload, UpdateCompanyPayload};
use crate::error::{Error, Result};
use crate::models::company::Company;
use crate::services::job_service::Actor;
use crate::utils::validation::normalize_email;

#[derive(Clone)]
pub struct CompanyService {
    pool: PgPool,
    max_per_employer: i64,
}

impl CompanyService {
    pub fn new(pool: PgPool, max_per_employer: i64) -> Self {
        Self {
            pool,
            max_per_employer,
        }
    }

    pub async fn create(&self, employer_id: Uuid, payload: CreateCompanyPayload) -> Result<Company> {
        let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies WHERE employer_id = $1")
            .bind(employer_id)
            .fetch_one(&self.pool)
            .await?;
        check_company_cap(owned, self.max_per_employer)?;

        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (employer_id, name, email, website, industry, size, location, description, logo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(employer_id)
        .bind(payload.name.trim())
        .bind(normalize_email(&payload.email))
        .bind(payload.website)
        .bind(payload.industry)
        .bind(payload.size)
        .bind(payload.location)
        .bind(payload.description)
        .bind(payload.logo_url)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(company_id = %company.id, %employer_id, "company created");
        Ok(company)
    }

    pub async fn mine(&self, employer_id: Uuid) -> Result<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE employer_id = $1 ORDER BY created_at DESC",
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    pub async fn get(&self, id: Uuid, actor: Actor) -> Result<Company> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Company not found".into()))?;
        if !(actor.is_admin || company.employer_id == actor.user_id) {
            return Err(Error::Forbidden("You do not own this company".into()));
        }
        Ok(company)
    }

    pub async fn update(&self, id: Uuid, actor: Actor, payload: UpdateCompanyPayload) -> Result<Company> {
        self.get(id, actor).await?;

        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                website = COALESCE($4, website),
                industry = COALESCE($5, industry),
                size = COALESCE($6, size),
                location = COALESCE($7, location),
                description = COALESCE($8, description),
                logo_url = COALESCE($9, logo_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.email.as_deref().map(normalize_email))
        .bind(payload.website)
        .bind(payload.industry)
        .bind(payload.size)
        .bind(payload.location)
        .bind(payload.description)
        .bind(payload.logo_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(company)
    }

    pub async fn delete(&self, id: Uuid, actor: Actor) -> Result<()> {
        self.get(id, actor).await?;
        sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(company_id = %id, "company deleted");
        Ok(())
    }
}

pub fn check_company_cap(owned: i64, max: i64) -> Result<()> {
    if owned >= max {
        return Err(Error::BadRequest(format!(
            "You can register at most {} companies",
            max
        )));
    }
    Ok(())
}
