use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::envelope::{Page, Paginated};
use crate::dto::user_dto::{UpdateProfilePayload, UserListQuery};
use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::utils::validation::{contains_pattern, normalize_skills};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    pub async fn update_profile(&self, id: Uuid, payload: UpdateProfilePayload) -> Result<User> {
        let skills = payload.skills.as_deref().map(normalize_skills);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                headline = COALESCE($4, headline),
                bio = COALESCE($5, bio),
                skills = COALESCE($6, skills),
                location = COALESCE($7, location),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.phone)
        .bind(payload.headline)
        .bind(payload.bio)
        .bind(skills)
        .bind(payload.location)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;

        Ok(user)
    }

    pub async fn set_resume_url(&self, id: Uuid, url: &str) -> Result<User> {
        self.set_file_url(id, "resume_url", url).await
    }

    pub async fn set_photo_url(&self, id: Uuid, url: &str) -> Result<User> {
        self.set_file_url(id, "photo_url", url).await
    }

    async fn set_file_url(&self, id: Uuid, column: &'static str, url: &str) -> Result<User> {
        let sql = format!(
            "UPDATE users SET {} = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            column
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    pub async fn list(&self, query: UserListQuery) -> Result<Paginated<User>> {
        let page = Page::new(query.page, query.per_page);
        let role = match query.role.as_deref().filter(|r| !r.trim().is_empty()) {
            Some(raw) => Some(raw.parse::<UserRole>().map_err(Error::BadRequest)?),
            None => None,
        };
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE 1=1");
        push_user_filters(&mut count, role, search.as_deref());
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE 1=1");
        push_user_filters(&mut select, role, search.as_deref());
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = select.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok(Paginated::new(items, total, page))
    }
}

fn push_user_filters<'a>(
    qb: &mut QueryBuilder<'a, Postgres>,
    role: Option<UserRole>,
    search: Option<&'a str>,
) {
    if let Some(role) = role {
        qb.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(pattern) = search {
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern)
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
