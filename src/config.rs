use std::{path::Path, time::Duration};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deadline applied to every request context.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Written into the `iss` claim of issued tokens.
    pub service_name: String,
    pub signature_key: String,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    pub max_name_len: usize,
    pub max_price: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub validation: ValidationConfig,
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        // Mirror defaults from config/default.toml
        Self { max_name_len: 255, max_price: 1_000_000_000 }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: inventorysvc.toml (in CWD)
        .add_source(::config::File::with_name("inventorysvc").required(false));

    if let Ok(custom_path) = std::env::var("INVENTORYSVC_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("INVENTORYSVC").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub(crate) fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }
    if cfg.server.request_timeout_secs == 0 {
        return Err(anyhow::anyhow!("server.request_timeout_secs must be > 0"));
    }

    // Database
    if cfg.database.max_connections == 0 || cfg.database.max_connections > 256 {
        return Err(anyhow::anyhow!("database.max_connections must be in 1..=256"));
    }

    // Auth
    if cfg.auth.signature_key.trim().is_empty() {
        return Err(anyhow::anyhow!("auth.signature_key must not be empty"));
    }
    if cfg.auth.token_ttl_secs == 0 || cfg.auth.token_ttl_secs > crate::auth::token::MAX_TTL_SECS as u64 {
        return Err(anyhow::anyhow!("auth.token_ttl_secs must be in 1..={}", crate::auth::token::MAX_TTL_SECS));
    }
    check_signature_key(&cfg.auth.signature_key, !cfg!(debug_assertions))?;

    // Validation
    if cfg.validation.max_name_len == 0 {
        return Err(anyhow::anyhow!("validation.max_name_len must be > 0"));
    }
    if cfg.validation.max_price <= 0 {
        return Err(anyhow::anyhow!("validation.max_price must be > 0"));
    }

    Ok(())
}

/// Signing key shipped in `config/default.toml`.
pub(crate) const DEFAULT_SIGNATURE_KEY: &str = "change-me-in-production";

/// Release builds refuse the shipped key; debug builds only warn.
pub(crate) fn check_signature_key(key: &str, strict: bool) -> anyhow::Result<()> {
    if key != DEFAULT_SIGNATURE_KEY {
        return Ok(());
    }
    if strict {
        return Err(anyhow::anyhow!(
            "auth.signature_key is the built-in default; set INVENTORYSVC__AUTH__SIGNATURE_KEY"
        ));
    }
    tracing::warn!("auth.signature_key is the built-in default; set INVENTORYSVC__AUTH__SIGNATURE_KEY");
    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        // On Windows, handle URLs like sqlite:///C:/... by stripping the leading '/'
        #[cfg(windows)]
        let path = {
            let bytes = path.as_bytes();
            if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' && bytes[1].is_ascii_alphabetic() {
                &path[1..]
            } else {
                path
            }
        };
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
