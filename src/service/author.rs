use chrono::Utc;

use crate::context::RequestContext;
use crate::error::{AppError, AppResult, OptionExt};
use crate::metrics::Metrics;
use crate::repository::{AuthorRepository, BookRepository};
use crate::service::fanout::FanOut;
use crate::store::Executor;
use crate::transaction::TransactionManager;
use crate::types::{
    AddAuthorBookRequest, Author, AuthorWithBook, Book, CreateAuthorAndBookRequest, CreateAuthorRequest, NewAuthor,
    NewBook,
};
use crate::validation::Validator;

#[derive(Clone)]
pub struct AuthorService {
    tx: TransactionManager,
    validator: Validator,
    metrics: Metrics,
    authors: AuthorRepository,
    books: BookRepository,
}

impl AuthorService {
    pub fn new(tx: TransactionManager, validator: Validator, metrics: Metrics) -> Self {
        Self { tx, validator, metrics, authors: AuthorRepository, books: BookRepository }
    }

    pub async fn create_author(&self, ctx: &RequestContext, req: CreateAuthorRequest) -> AppResult<Author> {
        self.validator.create_author(&req)?;
        let pool = self.tx.pool();
        self.ensure_name_free(ctx, Executor::Pool(pool), &req.name).await?;
        let author = self.authors.create(ctx, Executor::Pool(pool), &req.into()).await?;
        tracing::info!(author_id = author.id, "author created");
        Ok(author)
    }

    pub async fn add_author_book(&self, ctx: &RequestContext, req: AddAuthorBookRequest) -> AppResult<Book> {
        self.validator.add_author_book(&req)?;
        let pool = self.tx.pool();
        self.authors.get_by_id(ctx, Executor::Pool(pool), req.author_id).await?.ok_or_not_found("author")?;
        let new_book = NewBook {
            author_id: req.author_id,
            book_name: req.book_name,
            title: req.title,
            price: req.price,
            created_at: Utc::now(),
        };
        self.books.create(ctx, Executor::Pool(pool), &new_book).await
    }

    /// Creates the author and their first book in one transaction. Either
    /// both rows are committed or neither is.
    pub async fn create_author_and_book(
        &self,
        ctx: &RequestContext,
        req: CreateAuthorAndBookRequest,
    ) -> AppResult<AuthorWithBook> {
        self.create_author_and_book_in(ctx, Executor::Pool(self.tx.pool()), req).await
    }

    /// Same as [`create_author_and_book`](Self::create_author_and_book), but
    /// joins `exec` when it is already a transaction. The enclosing unit of
    /// work then decides whether both rows are kept.
    pub async fn create_author_and_book_in(
        &self,
        ctx: &RequestContext,
        mut exec: Executor<'_>,
        req: CreateAuthorAndBookRequest,
    ) -> AppResult<AuthorWithBook> {
        self.validator.create_author_and_book(&req)?;
        self.ensure_name_free(ctx, exec.reborrow(), &req.author.name).await?;

        let authors = self.authors;
        let books = self.books;
        let CreateAuthorAndBookRequest { author, book } = req;
        let new_author = NewAuthor::from(author);

        let created = self
            .tx
            .with_transaction_in(ctx, exec, move |ctx, tx| {
                Box::pin(async move {
                    let author = authors
                        .create(&ctx, tx.executor(), &new_author)
                        .await
                        .map_err(|e| e.context("author creation failed"))?;
                    let new_book = NewBook {
                        author_id: author.id,
                        book_name: book.book_name,
                        title: book.title,
                        price: book.price,
                        created_at: Utc::now(),
                    };
                    let book = books
                        .create(&ctx, tx.executor(), &new_book)
                        .await
                        .map_err(|e| e.context("book creation failed"))?;
                    Ok(AuthorWithBook { author, book })
                })
            })
            .await?;

        tracing::info!(author_id = created.author.id, book_id = created.book.id, "author and book created");
        Ok(created)
    }

    /// Books of an existing author, oldest first.
    pub async fn get_list_book_by_author(&self, ctx: &RequestContext, author_id: i64) -> AppResult<Vec<Book>> {
        self.validator.id("author_id", author_id)?;
        let pool = self.tx.pool();
        self.authors.get_by_id(ctx, Executor::Pool(pool), author_id).await?.ok_or_not_found("author")?;
        let books = self.books.get_list_by_author_id(ctx, Executor::Pool(pool), author_id).await?;
        if books.is_empty() {
            return Err(AppError::NotFound("book not found".to_string()));
        }
        Ok(books)
    }

    /// Deletes `book_id` only when it belongs to `author_id`.
    ///
    /// Book and author existence are checked concurrently; a missing one fails
    /// the call before anything is deleted. A book that exists but belongs to
    /// another author deletes nothing and is reported as not found.
    pub async fn delete_book_by_author(&self, ctx: &RequestContext, author_id: i64, book_id: i64) -> AppResult<()> {
        self.validator.id("author_id", author_id)?;
        self.validator.id("book_id", book_id)?;

        let mut scope = FanOut::<()>::new(ctx, &self.metrics);
        let (authors, books) = (self.authors, self.books);
        let pool = self.tx.pool().clone();
        scope.spawn(move |ctx| async move {
            books.get_by_id(&ctx, Executor::Pool(&pool), book_id).await?.ok_or_not_found("book").map(drop)
        });
        let pool = self.tx.pool().clone();
        scope.spawn(move |ctx| async move {
            authors.get_by_id(&ctx, Executor::Pool(&pool), author_id).await?.ok_or_not_found("author").map(drop)
        });
        scope.join().await?;

        let deleted = self.books.delete_by_author_id(ctx, Executor::Pool(self.tx.pool()), author_id, book_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("book not found for author".to_string()));
        }
        tracing::info!(author_id, book_id, "book deleted");
        Ok(())
    }

    async fn ensure_name_free(&self, ctx: &RequestContext, exec: Executor<'_>, name: &str) -> AppResult<()> {
        if self.authors.get_by_name(ctx, exec, name).await?.is_some() {
            return Err(AppError::Conflict(format!("author '{}' already exists", name.trim())));
        }
        Ok(())
    }
}
