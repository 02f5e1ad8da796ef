pub const DEFAULT_API_PORT: u16 = 8000;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 8000). Env var: `API_PORT`.
    pub api_port: u16,
    /// Maximum request body size; recipe images travel inline. Env var: `BODY_LIMIT_BYTES`.
    pub body_limit_bytes: usize,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            api_port: parse_or(std::env::var("API_PORT").ok(), DEFAULT_API_PORT),
            body_limit_bytes: parse_or(
                std::env::var("BODY_LIMIT_BYTES").ok(),
                DEFAULT_BODY_LIMIT_BYTES,
            ),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
