use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-only-secret-change-me";

/// Process configuration, read once from the environment at start-up
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub token_expiration_hours: i64,
    /// When unset the service runs on in-memory repositories
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET is not set, falling back to the development secret");
            DEV_JWT_SECRET.to_string()
        });

        Self {
            port: parse_env("PORT").unwrap_or(3000),
            jwt_secret,
            token_expiration_hours: parse_env("TOKEN_EXPIRATION_HOURS").unwrap_or(24),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_expiration_hours: 24,
            database_url: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring unparsable environment value");
            None
        }
    }
}
