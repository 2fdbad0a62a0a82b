use crate::context::RequestContext;
use crate::error::AppResult;
use crate::store::Executor;
use crate::types::{Book, BookChanges, NewBook};

const BOOK_COLUMNS: &str = "id, author_id, book_name, title, price, created_at";

#[derive(Debug, Clone, Copy, Default)]
pub struct BookRepository;

impl BookRepository {
    pub async fn create(&self, ctx: &RequestContext, exec: Executor<'_>, book: &NewBook) -> AppResult<Book> {
        let mut conn = exec.acquire(ctx).await?;
        let sql = format!(
            "INSERT INTO books (author_id, book_name, title, price, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
            BOOK_COLUMNS
        );
        let query = sqlx::query_as::<_, Book>(&sql)
            .bind(book.author_id)
            .bind(&book.book_name)
            .bind(&book.title)
            .bind(book.price)
            .bind(book.created_at);
        let created = ctx.run(query.fetch_one(&mut *conn)).await?;
        tracing::debug!(book_id = created.id, author_id = created.author_id, "book created");
        Ok(created)
    }

    /// Returns the number of rows updated (0 when the book does not exist).
    pub async fn update(&self, ctx: &RequestContext, exec: Executor<'_>, changes: &BookChanges) -> AppResult<u64> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query(
            r#"UPDATE books SET author_id = ?1, book_name = ?2, title = ?3, price = ?4
               WHERE id = ?5"#,
        )
        .bind(changes.author_id)
        .bind(&changes.book_name)
        .bind(&changes.title)
        .bind(changes.price)
        .bind(changes.id);
        let res = ctx.run(query.execute(&mut *conn)).await?;
        Ok(res.rows_affected())
    }

    pub async fn delete(&self, ctx: &RequestContext, exec: Executor<'_>, id: i64) -> AppResult<u64> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query("DELETE FROM books WHERE id = ?1").bind(id);
        let res = ctx.run(query.execute(&mut *conn)).await?;
        Ok(res.rows_affected())
    }

    pub async fn get_by_id(&self, ctx: &RequestContext, exec: Executor<'_>, id: i64) -> AppResult<Option<Book>> {
        let mut conn = exec.acquire(ctx).await?;
        let sql = format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS);
        let query = sqlx::query_as::<_, Book>(&sql).bind(id);
        ctx.run(query.fetch_optional(&mut *conn)).await
    }

    pub async fn get_list_by_author_id(
        &self,
        ctx: &RequestContext,
        exec: Executor<'_>,
        author_id: i64,
    ) -> AppResult<Vec<Book>> {
        let mut conn = exec.acquire(ctx).await?;
        let sql = format!("SELECT {} FROM books WHERE author_id = ?1 ORDER BY id", BOOK_COLUMNS);
        let query = sqlx::query_as::<_, Book>(&sql).bind(author_id);
        ctx.run(query.fetch_all(&mut *conn)).await
    }

    /// Deletes `book_id` only if it belongs to `author_id`.
    pub async fn delete_by_author_id(
        &self,
        ctx: &RequestContext,
        exec: Executor<'_>,
        author_id: i64,
        book_id: i64,
    ) -> AppResult<u64> {
        let mut conn = exec.acquire(ctx).await?;
        let query = sqlx::query("DELETE FROM books WHERE id = ?1 AND author_id = ?2")
            .bind(book_id)
            .bind(author_id);
        let res = ctx.run(query.execute(&mut *conn)).await?;
        Ok(res.rows_affected())
    }

    /// Most recently created book.
    pub async fn get_last(&self, ctx: &RequestContext, exec: Executor<'_>) -> AppResult<Option<Book>> {
        let mut conn = exec.acquire(ctx).await?;
        let sql = format!("SELECT {} FROM books ORDER BY created_at DESC, id DESC LIMIT 1", BOOK_COLUMNS);
        let query = sqlx::query_as::<_, Book>(&sql);
        ctx.run(query.fetch_optional(&mut *conn)).await
    }
}
