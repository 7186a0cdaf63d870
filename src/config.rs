use chrono::Duration;

const DEFAULT_JWT_SECRET: &str = "your-jwt-secret";

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs the service on the in-memory repository.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub max_connection_pooling: u32,
    pub port: u16,
    pub log_file: String,
    pub cors_origin: String,
    pub token_ttl: Duration,
}

impl Config {
    /// Reads the process environment, honoring a `.env` file.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        // optional fields
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
        let max_connection_pooling = parse_or(&lookup, "MAX_CONNECTION_POOLING", 5u32)?;
        let port = parse_or(&lookup, "PORT", 5000u16)?;
        let log_file = lookup("LOG_FILE").unwrap_or_else(|| "app.log".to_string());
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let token_ttl_minutes = parse_or(&lookup, "TOKEN_TTL_MINUTES", 24 * 60i64)?;

        if max_connection_pooling == 0 {
            return Err("MAX_CONNECTION_POOLING must be at least 1".to_string());
        }
        if token_ttl_minutes <= 0 {
            return Err("TOKEN_TTL_MINUTES must be positive".to_string());
        }

        Ok(Self {
            database_url,
            jwt_secret,
            max_connection_pooling,
            port,
            log_file,
            cors_origin,
            token_ttl: Duration::minutes(token_ttl_minutes),
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| format!("Invalid {key} value {raw:?}: {err}")),
        None => Ok(default),
    }
}
