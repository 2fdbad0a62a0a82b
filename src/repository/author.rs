use crate::context::RequestContext;
use crate::error::AppResult;
use crate::store::Executor;
use crate::types::{Author, NewAuthor};

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorRepository;

impl AuthorRepository {
    pub async fn create(&self, ctx: &RequestContext, exec: Executor<'_>, author: &NewAuthor) -> AppResult<Author> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query_as::<_, Author>(
            r#"INSERT INTO authors (name, email, phone_number) VALUES (?1, ?2, ?3)
               RETURNING id, name, email, phone_number"#,
        )
        .bind(&author.name)
        .bind(&author.email)
        .bind(&author.phone_number);
        let created = ctx.run(query.fetch_one(&mut *conn)).await?;
        tracing::debug!(author_id = created.id, "author created");
        Ok(created)
    }

    pub async fn get_by_id(&self, ctx: &RequestContext, exec: Executor<'_>, id: i64) -> AppResult<Option<Author>> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query_as::<_, Author>(
            "SELECT id, name, email, phone_number FROM authors WHERE id = ?1",
        )
        .bind(id);
        ctx.run(query.fetch_optional(&mut *conn)).await
    }

    /// Case-insensitive exact match on the author name.
    pub async fn get_by_name(&self, ctx: &RequestContext, exec: Executor<'_>, name: &str) -> AppResult<Option<Author>> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query_as::<_, Author>(
            "SELECT id, name, email, phone_number FROM authors WHERE name = ?1 LIMIT 1",
        )
        .bind(name);
        ctx.run(query.fetch_optional(&mut *conn)).await
    }
}
