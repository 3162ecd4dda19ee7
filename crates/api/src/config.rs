use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Message ingestion configuration (sync vs. queued).
    pub ingest: IngestConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            ingest: IngestConfig::from_env(),
        }
    }
}

/// How inbound messages reach the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// The create-message request classifies inline before returning.
    Sync,
    /// The message is persisted PENDING and a parse job is enqueued for
    /// the worker binary.
    Queue,
}

/// Message ingestion configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub mode: IngestMode,
}

impl IngestConfig {
    /// Load ingestion configuration from environment variables.
    ///
    /// | Env Var       | Default | Values           |
    /// |---------------|---------|------------------|
    /// | `INGEST_MODE` | `sync`  | `sync` / `queue` |
    ///
    /// # Panics
    ///
    /// Panics on an unknown mode: misconfiguration should fail at startup,
    /// not silently fall back.
    pub fn from_env() -> Self {
        let mode = match std::env::var("INGEST_MODE")
            .unwrap_or_else(|_| "sync".into())
            .as_str()
        {
            "sync" => IngestMode::Sync,
            "queue" => IngestMode::Queue,
            other => panic!("INGEST_MODE must be 'sync' or 'queue', got '{other}'"),
        };
        Self { mode }
    }
}
