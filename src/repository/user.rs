use crate::context::RequestContext;
use crate::error::AppResult;
use crate::store::Executor;
use crate::types::{NewUser, User};

#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    pub async fn create(&self, ctx: &RequestContext, exec: Executor<'_>, user: &NewUser) -> AppResult<User> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)
               RETURNING id, username, email, password_hash"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash);
        ctx.run(query.fetch_one(&mut *conn)).await
    }

    pub async fn get_by_id(&self, ctx: &RequestContext, exec: Executor<'_>, id: i64) -> AppResult<Option<User>> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash FROM users WHERE id = ?1",
        )
        .bind(id);
        ctx.run(query.fetch_optional(&mut *conn)).await
    }

    /// Matches either column case-insensitively. `email = None` matches on
    /// username only.
    pub async fn get_by_username_or_email(
        &self,
        ctx: &RequestContext,
        exec: Executor<'_>,
        username: &str,
        email: Option<&str>,
    ) -> AppResult<Option<User>> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash FROM users
               WHERE username = ?1 OR (?2 IS NOT NULL AND email = ?2)
               LIMIT 1"#,
        )
        .bind(username)
        .bind(email);
        ctx.run(query.fetch_optional(&mut *conn)).await
    }
}
