//! Server configuration

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, read from the environment (optionally seeded from `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Upper bound of the connection pool
    pub db_max_connections: u32,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Environment: development | staging | production
    pub environment: String,
    /// Insert demo users and books at boot
    pub seed_demo_data: bool,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BoxError> {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .filter(|s| !s.is_empty())
                .ok_or("DATABASE_URL must be set")?,
            http_port: parse_or(&lookup, "HTTP_PORT", 8080)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: require_secret(&lookup, "JWT_SECRET", &environment)?,
            jwt_expiry_hours: parse_or(&lookup, "JWT_EXPIRY_HOURS", 24)?,
            seed_demo_data: lookup("SEED_DEMO_DATA")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Require a secret: must be set and non-empty outside development.
fn require_secret(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    environment: &str,
) -> Result<String, BoxError> {
    let val = match lookup(name) {
        Some(v) => v,
        None => {
            if environment != "development" {
                return Err(format!("{name} must be set in {environment} environment").into());
            }
            format!("dev-{name}-not-for-production")
        }
    };
    if val.is_empty() && environment != "development" {
        return Err(format!("{name} must not be empty in {environment} environment").into());
    }
    Ok(val)
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, BoxError> {
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {raw}").into()),
        _ => Ok(default),
    }
}
