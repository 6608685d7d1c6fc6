//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// SES sender email address
    pub ses_from_email: String,
    /// Recipient of new-booking notifications
    pub admin_notify_email: String,
    /// When false, emails are logged instead of sent
    pub email_enabled: bool,
    /// Public site URL used in email links
    pub site_url: String,
    /// Exchange rate source returning `{ "rates": { ... } }`
    pub exchange_rate_api_url: String,
    /// How long fetched rates stay fresh
    pub exchange_rate_ttl_secs: u64,
    /// Currency the rates are quoted against
    pub base_currency: String,
    /// Bootstrap admin account (created on startup when missing)
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Allowed CORS origins; empty means permissive
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
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

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            environment,
            ses_from_email: std::env::var("SES_FROM_EMAIL")
                .unwrap_or_else(|_| "bookings@example.com".into()),
            admin_notify_email: std::env::var("ADMIN_NOTIFY_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".into()),
            email_enabled: std::env::var("EMAIL_ENABLED")
                .ok()
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_string(),
            exchange_rate_api_url: std::env::var("EXCHANGE_RATE_API_URL")
                .unwrap_or_else(|_| "https://open.er-api.com/v6/latest/THB".into()),
            exchange_rate_ttl_secs: std::env::var("EXCHANGE_RATE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            base_currency: std::env::var("BASE_CURRENCY")
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|_| "THB".into()),
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" 1 "));
        assert!(parse_bool("ON"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_require_secret() {
        assert_eq!(
            Config::require_secret("TRAVEL_CLOUD_TEST_UNSET_SECRET", "development").unwrap(),
            "dev-TRAVEL_CLOUD_TEST_UNSET_SECRET-not-for-production"
        );
        assert!(Config::require_secret("TRAVEL_CLOUD_TEST_UNSET_SECRET", "production").is_err());
    }
}
