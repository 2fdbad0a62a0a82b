#[cfg(test)]
mod tests {
    use crate::context::RequestContext;
    use crate::error::{AppError, AppResult};
    use crate::metrics::Metrics;
    use crate::repository::{AuthorRepository, BookRepository};
    use crate::service::Services;
    use crate::store::Executor;
    use crate::tests::{test_config, test_db, TestDb};
    use crate::transaction::TransactionManager;
    use crate::types::{
        AddAuthorBookRequest, Book, CreateAuthorAndBookRequest, CreateAuthorRequest, CreateBookRequest, LoginRequest,
        RegisterRequest, UpdateBookRequest,
    };

    async fn setup() -> (TestDb, Services, Metrics) {
        let db = test_db().await;
        let metrics = Metrics::new();
        let services = Services::new(db.pool.clone(), &test_config(), metrics.clone());
        (db, services, metrics)
    }

    fn author_req(name: &str) -> CreateAuthorRequest {
        CreateAuthorRequest { name: name.to_string(), email: "a@x.com".to_string(), phone_number: "1".to_string() }
    }

    fn author_and_book(name: &str, title: &str) -> CreateAuthorAndBookRequest {
        CreateAuthorAndBookRequest {
            author: author_req(name),
            book: CreateBookRequest { author_id: 0, book_name: "B".to_string(), title: title.to_string(), price: 100 },
        }
    }

    async fn author_named(pool: &sqlx::SqlitePool, name: &str) -> bool {
        AuthorRepository
            .get_by_name(&RequestContext::new(), Executor::Pool(pool), name)
            .await
            .unwrap()
            .is_some()
    }

    async fn book_count(pool: &sqlx::SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM books").fetch_one(pool).await.unwrap()
    }

    async fn add_book(services: &Services, author_id: i64, name: &str) -> Book {
        let req = AddAuthorBookRequest { author_id, book_name: name.to_string(), title: "T".to_string(), price: 10 };
        services.authors.add_author_book(&RequestContext::new(), req).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_author_and_book_commits_both_rows() {
        let (db, services, metrics) = setup().await;

        let created = services
            .authors
            .create_author_and_book(&RequestContext::new(), author_and_book("A", "T"))
            .await
            .unwrap();

        assert_eq!(created.book.author_id, created.author.id);
        assert_eq!(created.book.price, 100);
        assert!(author_named(&db.pool, "A").await);
        assert_eq!(book_count(&db.pool).await, 1);
        assert_eq!(metrics.get_snapshot().transactions_committed, 1);
    }

    #[tokio::test]
    async fn test_failed_book_creation_leaves_no_author() {
        let (db, services, metrics) = setup().await;
        sqlx::query(
            r#"CREATE TRIGGER reject_book BEFORE INSERT ON books WHEN NEW.title = 'boom'
               BEGIN SELECT RAISE(ABORT, 'book rejected'); END"#,
        )
        .execute(&db.pool)
        .await
        .unwrap();

        let err = services
            .authors
            .create_author_and_book(&RequestContext::new(), author_and_book("A", "boom"))
            .await
            .unwrap_err();

        match err.abort_cause() {
            Some(AppError::Database(msg)) => {
                assert!(msg.starts_with("book creation failed"), "unexpected message {}", msg);
                assert!(msg.contains("book rejected"));
            }
            other => panic!("expected aborted Database error, got {:?}", other),
        }
        assert!(!author_named(&db.pool, "A").await);
        assert_eq!(book_count(&db.pool).await, 0);
        assert_eq!(metrics.get_snapshot().transactions_rolled_back, 1);
    }

    #[tokio::test]
    async fn test_create_author_and_book_rejects_invalid_input_before_store() {
        let (_db, services, metrics) = setup().await;
        let mut req = author_and_book("A", "T");
        req.book.price = 0;

        match services.authors.create_author_and_book(&RequestContext::new(), req).await {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "price"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(metrics.get_snapshot().transactions_started, 0);
    }

    #[tokio::test]
    async fn test_create_author_and_book_rejects_existing_name() {
        let (_db, services, _metrics) = setup().await;
        services.authors.create_author(&RequestContext::new(), author_req("A")).await.unwrap();

        let err = services
            .authors
            .create_author_and_book(&RequestContext::new(), author_and_book("a", "T"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_nested_create_joins_outer_transaction() {
        let (db, services, metrics) = setup().await;
        let manager = TransactionManager::new(db.pool.clone(), metrics.clone());
        let authors = services.authors.clone();

        let res: AppResult<()> = manager
            .with_transaction(&RequestContext::new(), move |ctx, tx| {
                Box::pin(async move {
                    authors.create_author_and_book_in(&ctx, tx.executor(), author_and_book("A", "T")).await?;
                    Err(AppError::BadRequest("outer step failed".to_string()))
                })
            })
            .await;

        assert!(res.is_err());
        assert!(!author_named(&db.pool, "A").await);
        assert_eq!(book_count(&db.pool).await, 0);
        let snap = metrics.get_snapshot();
        assert_eq!(snap.transactions_started, 1);
        assert_eq!(snap.transactions_committed, 0);
        assert_eq!(snap.transactions_rolled_back, 1);
    }

    #[tokio::test]
    async fn test_scoped_delete_of_foreign_book_is_not_found() {
        let (db, services, _metrics) = setup().await;
        let ctx = RequestContext::new();
        services.authors.create_author(&ctx, author_req("First")).await.unwrap();
        let requester = services.authors.create_author(&ctx, author_req("Second")).await.unwrap();
        let owner = services.authors.create_author(&ctx, author_req("Third")).await.unwrap();
        let book = add_book(&services, owner.id, "theirs").await;

        match services.authors.delete_book_by_author(&ctx, requester.id, book.id).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "book not found for author"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        let still_there = BookRepository.get_by_id(&ctx, Executor::Pool(&db.pool), book.id).await.unwrap();
        assert!(still_there.is_some());

        services.authors.delete_book_by_author(&ctx, owner.id, book.id).await.unwrap();
        assert_eq!(book_count(&db.pool).await, 0);
    }

    #[tokio::test]
    async fn test_scoped_delete_reports_missing_book() {
        let (_db, services, _metrics) = setup().await;
        let ctx = RequestContext::new();
        let author = services.authors.create_author(&ctx, author_req("A")).await.unwrap();

        match services.authors.delete_book_by_author(&ctx, author.id, 99).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "book not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_with_missing_author_reports_author_not_found() {
        let (db, services, metrics) = setup().await;
        let ctx = RequestContext::new();
        let author = services.authors.create_author(&ctx, author_req("A")).await.unwrap();
        let book = add_book(&services, author.id, "b").await;

        let req = UpdateBookRequest {
            id: book.id,
            author_id: 9,
            book_name: "b2".to_string(),
            title: "T2".to_string(),
            price: 20,
        };
        match services.books.update_book(&ctx, req).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "author not found"),
            other => panic!("expected author NotFound, got {:?}", other),
        }
        let unchanged = BookRepository.get_by_id(&ctx, Executor::Pool(&db.pool), book.id).await.unwrap().unwrap();
        assert_eq!(unchanged.book_name, "b");
        assert_eq!(metrics.get_snapshot().fanouts_aborted, 1);
    }

    #[tokio::test]
    async fn test_update_book_moves_book_between_authors() {
        let (_db, services, _metrics) = setup().await;
        let ctx = RequestContext::new();
        let from = services.authors.create_author(&ctx, author_req("From")).await.unwrap();
        let to = services.authors.create_author(&ctx, author_req("To")).await.unwrap();
        let book = add_book(&services, from.id, "b").await;

        let req = UpdateBookRequest {
            id: book.id,
            author_id: to.id,
            book_name: "b2".to_string(),
            title: "T2".to_string(),
            price: 20,
        };
        let updated = services.books.update_book(&ctx, req).await.unwrap();
        assert_eq!((updated.author_id, updated.book_name.as_str(), updated.price), (to.id, "b2", 20));
        assert_eq!(updated.created_at, book.created_at);
    }

    #[tokio::test]
    async fn test_book_detail_and_delete() {
        let (_db, services, _metrics) = setup().await;
        let ctx = RequestContext::new();
        let author = services.authors.create_author(&ctx, author_req("Ada")).await.unwrap();
        let req = CreateBookRequest { author_id: author.id, book_name: "n".to_string(), title: "t".to_string(), price: 5 };
        let book = services.books.add_book(&ctx, req).await.unwrap();

        let detail = services.books.get_detail_book(&ctx, book.id).await.unwrap();
        assert_eq!(detail.author_name, "Ada");
        assert_eq!(detail.id, book.id);

        services.books.delete_book(&ctx, book.id).await.unwrap();
        assert!(services.books.get_detail_book(&ctx, book.id).await.unwrap_err().is_not_found());
        assert!(services.books.delete_book(&ctx, book.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_add_book_requires_existing_author() {
        let (_db, services, _metrics) = setup().await;
        let req = CreateBookRequest { author_id: 77, book_name: "n".to_string(), title: "t".to_string(), price: 5 };

        match services.books.add_book(&RequestContext::new(), req).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "author not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_books_by_author() {
        let (_db, services, _metrics) = setup().await;
        let ctx = RequestContext::new();
        let author = services.authors.create_author(&ctx, author_req("A")).await.unwrap();

        match services.authors.get_list_book_by_author(&ctx, author.id).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "book not found"),
            other => panic!("expected NotFound for empty list, got {:?}", other),
        }

        add_book(&services, author.id, "one").await;
        add_book(&services, author.id, "two").await;
        let books = services.authors.get_list_book_by_author(&ctx, author.id).await.unwrap();
        assert_eq!(books.iter().map(|b| b.book_name.as_str()).collect::<Vec<_>>(), vec!["one", "two"]);

        assert!(services.authors.get_list_book_by_author(&ctx, author.id + 10).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let (_db, services, _metrics) = setup().await;
        let ctx = RequestContext::new();
        let register = RegisterRequest {
            username: "reader".to_string(),
            email: "reader@x.com".to_string(),
            password: "secret-pass".to_string(),
        };
        let user = services.auth.register(&ctx, register.clone()).await.unwrap();
        assert_eq!(user.username, "reader");

        let dup = services.auth.register(&ctx, register).await.unwrap_err();
        assert!(matches!(dup, AppError::Conflict(_)), "got {:?}", dup);

        let session = services
            .auth
            .login(&ctx, LoginRequest { username: "reader".to_string(), password: "secret-pass".to_string() })
            .await
            .unwrap();
        assert_eq!(session.username, "reader");
        assert_eq!(services.auth.tokens().verify_token(&session.token).unwrap(), user.id);

        let current = services.auth.authenticate(&ctx, &session.token).await.unwrap();
        assert_eq!(current, user);

        let wrong = services
            .auth
            .login(&ctx, LoginRequest { username: "reader".to_string(), password: "wrong-pass".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(wrong, AppError::Unauthorized(_)), "got {:?}", wrong);

        let unknown = services
            .auth
            .login(&ctx, LoginRequest { username: "nobody".to_string(), password: "secret-pass".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(unknown, AppError::Unauthorized(_)), "got {:?}", unknown);
    }
}
