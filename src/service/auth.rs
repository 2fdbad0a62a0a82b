use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthTokenService;
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::repository::UserRepository;
use crate::store::Executor;
use crate::types::{CurrentUser, LoginRequest, LoginResponse, NewUser, RegisterRequest};
use crate::validation::Validator;

const INVALID_CREDENTIALS: &str = "invalid username or password";

#[derive(Clone)]
pub struct AuthService {
    pool: sqlx::SqlitePool,
    validator: Validator,
    tokens: AuthTokenService,
    users: UserRepository,
}

impl AuthService {
    pub fn new(pool: sqlx::SqlitePool, validator: Validator, tokens: AuthTokenService) -> Self {
        Self { pool, validator, tokens, users: UserRepository }
    }

    pub fn tokens(&self) -> &AuthTokenService {
        &self.tokens
    }

    pub async fn register(&self, ctx: &RequestContext, req: RegisterRequest) -> AppResult<CurrentUser> {
        self.validator.register(&req)?;
        let existing = self
            .users
            .get_by_username_or_email(ctx, Executor::Pool(&self.pool), &req.username, Some(&req.email))
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("username or email already registered".to_string()));
        }

        let password = req.password;
        let password_hash = run_blocking(move || hash_password(&password)).await?;
        let user = self
            .users
            .create(ctx, Executor::Pool(&self.pool), &NewUser { username: req.username, email: req.email, password_hash })
            .await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user.into())
    }

    pub async fn login(&self, ctx: &RequestContext, req: LoginRequest) -> AppResult<LoginResponse> {
        self.validator.login(&req)?;
        let user = self
            .users
            .get_by_username_or_email(ctx, Executor::Pool(&self.pool), &req.username, None)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let password = req.password;
        let hash = user.password_hash.clone();
        if !run_blocking(move || verify_password(&password, &hash)).await? {
            tracing::debug!(user_id = user.id, "login rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.tokens.generate_token(&user)?;
        Ok(LoginResponse { username: user.username, token })
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate(&self, ctx: &RequestContext, token: &str) -> AppResult<CurrentUser> {
        let user_id = self.tokens.verify_token(token)?;
        let user = self
            .users
            .get_by_id(ctx, Executor::Pool(&self.pool), user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("user not found".to_string()))?;
        Ok(user.into())
    }
}

// Argon2 hashing blocks; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password task failed: {}", e)))?
}
