use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::envelope::{Page, Paginated};
use crate::error::{Error, Result};
use crate::models::student::{NewStudent, Student};
use crate::services::job_service::Actor;
use crate::utils::token::generate_certificate_id;

const CERTIFICATE_ID_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct StudentService {
    pool: PgPool,
}

impl StudentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts one student with a fresh certificate id, retrying on the rare
    /// id collision.
    pub async fn insert(&self, uploaded_by: Uuid, student: &NewStudent) -> Result<Student> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let certificate_id = generate_certificate_id(chrono::Utc::now());
            let result = sqlx::query_as::<_, Student>(
                r#"
                INSERT INTO students (uploaded_by, name, email, course, institution, grade, completion_date, certificate_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(uploaded_by)
            .bind(&student.name)
            .bind(&student.email)
            .bind(&student.course)
            .bind(&student.institution)
            .bind(&student.grade)
            .bind(student.completion_date)
            .bind(&certificate_id)
            .fetch_one(&self.pool)
            .await;

            match result {
                Err(sqlx::Error::Database(db))
                    if db.constraint() == Some("students_certificate_id_key")
                        && attempt < CERTIFICATE_ID_ATTEMPTS =>
                {
                    tracing::warn!(%certificate_id, "certificate id collision, regenerating");
                }
                other => return Ok(other?),
            }
        }
    }

    pub async fn create(&self, uploaded_by: Uuid, student: NewStudent) -> Result<Student> {
        if self.exists(&student.email, &student.course).await? {
            return Err(Error::BadRequest(
                "A student with this email is already enrolled in this course".into(),
            ));
        }
        self.insert(uploaded_by, &student).await
    }

    pub async fn exists(&self, email: &str, course: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM students WHERE LOWER(email) = LOWER($1) AND LOWER(course) = LOWER($2))",
        )
        .bind(email)
        .bind(course)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Lower-cased (email, course) pairs already stored for the given emails.
    pub async fn existing_keys(&self, emails: &[String]) -> Result<Vec<(String, String)>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT LOWER(email), LOWER(course) FROM students WHERE LOWER(email) = ANY($1)",
        )
        .bind(emails)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list(&self, actor: Actor, page: Page) -> Result<Paginated<Student>> {
        let scope = if actor.is_admin { None } else { Some(actor.user_id) };

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM students WHERE ($1::uuid IS NULL OR uploaded_by = $1)",
        )
        .bind(scope)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Student>(
            r#"
            SELECT * FROM students
            WHERE ($1::uuid IS NULL OR uploaded_by = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(scope)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, page))
    }

    pub async fn get_managed(&self, id: Uuid, actor: Actor) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Student not found".into()))?;
        if !(actor.is_admin || student.uploaded_by == actor.user_id) {
            return Err(Error::Forbidden("You did not upload this student".into()));
        }
        Ok(student)
    }

    pub async fn find_by_certificate(&self, certificate_id: &str) -> Result<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE certificate_id = $1")
            .bind(certificate_id.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Certificate not found".into()))
    }

    pub async fn set_pdf_path(&self, id: Uuid, pdf_path: &str) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            "UPDATE students SET pdf_path = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(pdf_path)
        .fetch_one(&self.pool)
        .await?;
        Ok(student)
    }

    pub async fn delete(&self, id: Uuid, actor: Actor) -> Result<()> {
        self.get_managed(id, actor).await?;
        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
