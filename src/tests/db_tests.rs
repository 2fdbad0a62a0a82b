#[cfg(test)]
mod tests {
    use crate::db;
    use crate::error::AppError;
    use crate::tests::test_db;

    #[tokio::test]
    async fn test_init_db() {
        let db = test_db().await;

        let tables: Vec<String> = sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&db.pool)
            .await
            .unwrap();

        for table in ["authors", "books", "users"] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_init_db_is_idempotent() {
        let db = test_db().await;
        sqlx::query("INSERT INTO authors (name, email, phone_number) VALUES ('A', 'a@x.com', '1')")
            .execute(&db.pool)
            .await
            .unwrap();

        db::init_db(&db.pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors").fetch_one(&db.pool).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_pragmas_applied_on_every_connection() {
        let db = test_db().await;

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode").fetch_one(&db.pool).await.unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        // Hold several connections at once so more than one is checked
        let mut conns = Vec::new();
        for _ in 0..3 {
            conns.push(db.pool.acquire().await.unwrap());
        }
        for conn in conns.iter_mut() {
            let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(&mut **conn).await.unwrap();
            assert_eq!(fk, 1);
        }
    }

    #[tokio::test]
    async fn test_constraints_surface_as_conflict() {
        let db = test_db().await;

        let orphan = sqlx::query("INSERT INTO books (author_id, book_name, title, price) VALUES (99, 'b', 't', 1)")
            .execute(&db.pool)
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(orphan), AppError::Conflict(_)));

        sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('Reader', 'r@x.com', 'h')")
            .execute(&db.pool)
            .await
            .unwrap();
        let dup = sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('reader', 'other@x.com', 'h')")
            .execute(&db.pool)
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(dup), AppError::Conflict(_)));
    }
}
