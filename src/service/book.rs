use chrono::Utc;

use crate::context::RequestContext;
use crate::error::{AppError, AppResult, OptionExt};
use crate::metrics::Metrics;
use crate::repository::{AuthorRepository, BookRepository};
use crate::service::fanout::FanOut;
use crate::store::Executor;
use crate::transaction::TransactionManager;
use crate::types::{Book, BookChanges, CreateBookRequest, DetailBook, NewBook, UpdateBookRequest};
use crate::validation::Validator;

#[derive(Clone)]
pub struct BookService {
    tx: TransactionManager,
    validator: Validator,
    metrics: Metrics,
    authors: AuthorRepository,
    books: BookRepository,
}

impl BookService {
    pub fn new(tx: TransactionManager, validator: Validator, metrics: Metrics) -> Self {
        Self { tx, validator, metrics, authors: AuthorRepository, books: BookRepository }
    }

    pub async fn add_book(&self, ctx: &RequestContext, req: CreateBookRequest) -> AppResult<Book> {
        self.validator.create_book(&req)?;
        let pool = self.tx.pool();
        self.authors.get_by_id(ctx, Executor::Pool(pool), req.author_id).await?.ok_or_not_found("author")?;
        let new_book = NewBook {
            author_id: req.author_id,
            book_name: req.book_name,
            title: req.title,
            price: req.price,
            created_at: Utc::now(),
        };
        let book = self.books.create(ctx, Executor::Pool(pool), &new_book).await?;
        tracing::info!(book_id = book.id, author_id = book.author_id, "book added");
        Ok(book)
    }

    pub async fn delete_book(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.validator.id("id", id)?;
        let pool = self.tx.pool();
        self.books.get_by_id(ctx, Executor::Pool(pool), id).await?.ok_or_not_found("book")?;
        // Another request may have removed it since the lookup.
        if self.books.delete(ctx, Executor::Pool(pool), id).await? == 0 {
            return Err(AppError::NotFound("book not found".to_string()));
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    /// The book joined with its author's name. The author lookup needs the
    /// book's `author_id`, so the two reads are sequential.
    pub async fn get_detail_book(&self, ctx: &RequestContext, id: i64) -> AppResult<DetailBook> {
        self.validator.id("id", id)?;
        let pool = self.tx.pool();
        let book = self.books.get_by_id(ctx, Executor::Pool(pool), id).await?.ok_or_not_found("book")?;
        let author = self.authors.get_by_id(ctx, Executor::Pool(pool), book.author_id).await?.ok_or_not_found("author")?;
        Ok(DetailBook {
            id: book.id,
            author_id: book.author_id,
            author_name: author.name,
            book_name: book.book_name,
            title: book.title,
            price: book.price,
            created_at: book.created_at,
        })
    }

    /// Replaces a book's fields after checking, concurrently, that both the
    /// book and the target author exist.
    pub async fn update_book(&self, ctx: &RequestContext, req: UpdateBookRequest) -> AppResult<Book> {
        self.validator.update_book(&req)?;

        let mut scope = FanOut::<()>::new(ctx, &self.metrics);
        let (authors, books) = (self.authors, self.books);
        let (book_id, author_id) = (req.id, req.author_id);
        let pool = self.tx.pool().clone();
        scope.spawn(move |ctx| async move {
            books.get_by_id(&ctx, Executor::Pool(&pool), book_id).await?.ok_or_not_found("book").map(drop)
        });
        let pool = self.tx.pool().clone();
        scope.spawn(move |ctx| async move {
            authors.get_by_id(&ctx, Executor::Pool(&pool), author_id).await?.ok_or_not_found("author").map(drop)
        });
        scope.join().await?;

        let changes = BookChanges::from(req);
        let updated = self
            .tx
            .with_transaction(ctx, move |ctx, tx| {
                Box::pin(async move {
                    if books.update(&ctx, tx.executor(), &changes).await? == 0 {
                        return Err(AppError::NotFound("book not found".to_string()));
                    }
                    books.get_by_id(&ctx, tx.executor(), changes.id).await?.ok_or_not_found("book")
                })
            })
            .await?;
        tracing::info!(book_id = updated.id, "book updated");
        Ok(updated)
    }
}
