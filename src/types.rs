use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub author_id: i64,
    pub book_name: String,
    pub title: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

// Insert payloads (id assigned by the store)
#[derive(Debug, Clone)]
pub struct NewAuthor {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub author_id: i64,
    pub book_name: String,
    pub title: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Full replacement of a book's mutable columns.
#[derive(Debug, Clone)]
pub struct BookChanges {
    pub id: i64,
    pub author_id: i64,
    pub book_name: String,
    pub title: String,
    pub price: i64,
}

// Request DTOs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthorRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

impl From<CreateAuthorRequest> for NewAuthor {
    fn from(req: CreateAuthorRequest) -> Self {
        Self { name: req.name, email: req.email, phone_number: req.phone_number }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub author_id: i64,
    pub book_name: String,
    pub title: String,
    pub price: i64,
}

/// Book fields for `POST /managements/author/{id}`; the author comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddAuthorBookRequest {
    #[serde(skip)]
    pub author_id: i64,
    pub book_name: String,
    pub title: String,
    pub price: i64,
}

/// Creates an author and their first book atomically. `book.author_id` is
/// ignored and replaced with the new author's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthorAndBookRequest {
    pub author: CreateAuthorRequest,
    pub book: CreateBookRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(skip)]
    pub id: i64,
    pub author_id: i64,
    pub book_name: String,
    pub title: String,
    pub price: i64,
}

impl From<UpdateBookRequest> for BookChanges {
    fn from(req: UpdateBookRequest) -> Self {
        Self {
            id: req.id,
            author_id: req.author_id,
            book_name: req.book_name,
            title: req.title,
            price: req.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// Response DTOs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailBook {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub book_name: String,
    pub title: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorWithBook {
    pub author: Author,
    pub book: Book,
}

/// The authenticated caller, placed in request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self { id: user.id, username: user.username, email: user.email }
    }
}
