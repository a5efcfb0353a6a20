/// Configuration management for the API server
///
/// Built once at startup from environment variables and handed to the
/// constructors that need it. Nothing reads the environment after that.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT` or `API_PORT`: Port to bind to (default: 10000)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required)
/// - `JWT_TTL_DAYS`: Token lifetime in days (default: 7, at most 3650)
/// - `PASSWORD_MEMORY_KIB`, `PASSWORD_ITERATIONS`, `PASSWORD_PARALLELISM`:
///   Argon2id work factor (default: 19456 / 2 / 1)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `STATIC_DIR`: Directory holding the client shell (default: frontend)
/// - `APP_ENV`: `production` enables HSTS (default: development)
///
/// # Example
///
/// ```no_run
/// use tasktrack_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::{env, str::FromStr};

use chrono::Duration;
use tasktrack_shared::{auth::password::HashParams, db::pool::DatabaseConfig};

/// Default port, also used by the hosted deployment
pub const DEFAULT_PORT: u16 = 10000;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime, in days
pub const MAX_TTL_DAYS: i64 = 3650;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseSettings,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Password hashing work factor
    pub password: HashParams,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,

    /// Directory served for unmatched GET requests
    pub static_dir: String,

    /// Running in production
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in days
    pub ttl_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl_days", &self.ttl_days)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric variable doesn't parse
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("Invalid port {:?}: {}", port, e))?,
            None => DEFAULT_PORT,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|origins| parse_origins(&origins))
            .unwrap_or_default();

        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| "frontend".to_string());
        let production = lookup("APP_ENV")
            .map(|env| env.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let ttl_days = parse_or(&lookup, "JWT_TTL_DAYS", 7)?;
        if !(1..=MAX_TTL_DAYS).contains(&ttl_days) {
            anyhow::bail!("JWT_TTL_DAYS must be between 1 and {}", MAX_TTL_DAYS);
        }

        let defaults = HashParams::default();
        let password = HashParams {
            memory_kib: parse_or(&lookup, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "PASSWORD_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                static_dir,
                production,
            },
            database: DatabaseSettings {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_days,
            },
            password,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Token lifetime
    pub fn token_ttl(&self) -> Duration {
        Duration::days(self.jwt.ttl_days)
    }

    /// Pool settings for the shared database layer
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {} {:?}: {}", key, value, e)),
        None => Ok(default),
    }
}

/// `*` (or nothing) means any origin
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:10000");
        assert!(config.api.cors_origins.is_empty());
        assert_eq!(config.api.static_dir, "frontend");
        assert!(!config.api.production);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.token_ttl(), Duration::days(7));
        assert_eq!(config.password, HashParams::default());
    }

    #[test]
    fn test_port_prefers_port_over_api_port() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("PORT", "3000"),
            ("API_PORT", "4000"),
        ])
        .unwrap();
        assert_eq!(config.api.port, 3000);

        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "4000"),
        ])
        .unwrap();
        assert_eq!(config.api.port, 4000);
    }

    #[test]
    fn test_secret_required_and_long_enough() {
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/test")]).is_err());
        assert!(load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", "short"),
        ])
        .is_err());
    }

    #[test]
    fn test_ttl_days_bounds() {
        let with_ttl = |days: &str| {
            load(&[
                ("DATABASE_URL", "postgresql://localhost/test"),
                ("JWT_SECRET", SECRET),
                ("JWT_TTL_DAYS", days),
            ])
        };

        assert!(with_ttl("0").is_err());
        assert!(with_ttl("-1").is_err());
        assert!(with_ttl("3651").is_err());
        assert!(with_ttl("9223372036854775807").is_err());

        let config = with_ttl("3650").unwrap();
        assert_eq!(config.token_ttl(), Duration::days(MAX_TTL_DAYS));
    }

    #[test]
    fn test_database_url_required() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let result = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("PASSWORD_ITERATIONS", "many"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cors_origins_and_production() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("APP_ENV", "production"),
        ])
        .unwrap();

        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.api.production);

        assert!(parse_origins("*").is_empty());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert!(!format!("{:?}", config).contains(SECRET));
    }
}
