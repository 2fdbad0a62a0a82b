//! Structural validation of incoming requests.
//!
//! A [`Validator`] is built from [`ValidationConfig`] and handed to each
//! orchestrator; it never touches the store. Failures are
//! `AppError::ValidationError` naming the offending field.

use crate::config::ValidationConfig;
use crate::error::{AppError, AppResult};
use crate::types::{
    AddAuthorBookRequest, CreateAuthorAndBookRequest, CreateAuthorRequest, CreateBookRequest, LoginRequest,
    RegisterRequest, UpdateBookRequest,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct Validator {
    cfg: ValidationConfig,
}

impl Validator {
    pub fn new(cfg: ValidationConfig) -> Self {
        Self { cfg }
    }

    pub fn create_author(&self, req: &CreateAuthorRequest) -> AppResult<()> {
        self.required_text("name", &req.name)?;
        self.email("email", &req.email)?;
        self.required_text("phone_number", &req.phone_number)
    }

    pub fn create_book(&self, req: &CreateBookRequest) -> AppResult<()> {
        positive_id("author_id", req.author_id)?;
        self.book_fields(&req.book_name, &req.title, req.price)
    }

    pub fn add_author_book(&self, req: &AddAuthorBookRequest) -> AppResult<()> {
        positive_id("author_id", req.author_id)?;
        self.book_fields(&req.book_name, &req.title, req.price)
    }

    /// `book.author_id` is not checked: the new author's id replaces it.
    pub fn create_author_and_book(&self, req: &CreateAuthorAndBookRequest) -> AppResult<()> {
        self.create_author(&req.author)?;
        self.book_fields(&req.book.book_name, &req.book.title, req.book.price)
    }

    pub fn update_book(&self, req: &UpdateBookRequest) -> AppResult<()> {
        positive_id("id", req.id)?;
        positive_id("author_id", req.author_id)?;
        self.book_fields(&req.book_name, &req.title, req.price)
    }

    /// Path identifiers must be positive.
    pub fn id(&self, field: &str, value: i64) -> AppResult<()> {
        positive_id(field, value)
    }

    pub fn register(&self, req: &RegisterRequest) -> AppResult<()> {
        self.required_text("username", &req.username)?;
        self.email("email", &req.email)?;
        password("password", &req.password)
    }

    pub fn login(&self, req: &LoginRequest) -> AppResult<()> {
        self.required_text("username", &req.username)?;
        if req.password.is_empty() {
            return Err(invalid("password", "password is required"));
        }
        Ok(())
    }

    fn book_fields(&self, book_name: &str, title: &str, price: i64) -> AppResult<()> {
        self.required_text("book_name", book_name)?;
        self.required_text("title", title)?;
        if price <= 0 {
            return Err(invalid("price", "price is required"));
        }
        if price > self.cfg.max_price {
            return Err(invalid("price", &format!("price value must be lower than {}", self.cfg.max_price)));
        }
        Ok(())
    }

    fn required_text(&self, field: &str, value: &str) -> AppResult<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid(field, &format!("{} is required", field)));
        }
        if trimmed.chars().count() > self.cfg.max_name_len {
            return Err(invalid(field, &format!("{} must be at most {} characters", field, self.cfg.max_name_len)));
        }
        if value.contains('\0') {
            return Err(invalid(field, &format!("{} contains null characters", field)));
        }
        Ok(())
    }

    fn email(&self, field: &str, value: &str) -> AppResult<()> {
        self.required_text(field, value)?;
        let valid = match value.trim().split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(invalid(field, &format!("{} is not valid email", field)));
        }
        Ok(())
    }
}

fn positive_id(field: &str, value: i64) -> AppResult<()> {
    if value <= 0 {
        return Err(invalid(field, &format!("Value must be positive, got {}", value)));
    }
    Ok(())
}

fn password(field: &str, value: &str) -> AppResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(field, &format!("{} must be at least {} characters", field, MIN_PASSWORD_LEN)));
    }
    Ok(())
}

fn invalid(field: &str, message: &str) -> AppError {
    AppError::ValidationError { field: field.to_string(), message: message.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(name: &str, email: &str) -> CreateAuthorRequest {
        CreateAuthorRequest { name: name.into(), email: email.into(), phone_number: "1".into() }
    }

    #[test]
    fn accepts_well_formed_author() {
        assert!(Validator::default().create_author(&author("A", "a@x.com")).is_ok());
    }

    #[test]
    fn rejects_blank_name_and_bad_email() {
        let v = Validator::default();
        match v.create_author(&author("  ", "a@x.com")) {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "name"),
            other => panic!("expected name error, got {:?}", other),
        }
        for bad in ["ax.com", "a@x", "@x.com", "a@@x.com", "a b@x.com"] {
            match v.create_author(&author("A", bad)) {
                Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "email"),
                other => panic!("expected email error for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn price_bounds_come_from_config() {
        let v = Validator::new(ValidationConfig { max_name_len: 10, max_price: 50 });
        let mut req = CreateBookRequest { author_id: 1, book_name: "B".into(), title: "T".into(), price: 51 };
        assert!(v.create_book(&req).is_err());
        req.price = 50;
        assert!(v.create_book(&req).is_ok());
        req.price = 0;
        assert!(v.create_book(&req).is_err());
    }
}
