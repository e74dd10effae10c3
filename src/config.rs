use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: u64,
    pub cookie_ttl_days: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub media_endpoint: String,
    pub media_bucket: String,
    pub media_access_key: String,
    pub media_secret_key: String,
}

/// TTL env vars must be whole positive day counts; anything else
/// (negative, zero, junk) falls back to the default.
fn positive_days(var: &str) -> Option<u64> {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|days| *days > 0)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "auctionhouse".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "auctionhouse-users".into()),
            ttl_days: positive_days("JWT_TTL_DAYS").unwrap_or(7),
            cookie_ttl_days: positive_days("COOKIE_TTL_DAYS").unwrap_or(7),
        };
        Ok(Self {
            database_url,
            jwt,
            media_endpoint: std::env::var("MEDIA_ENDPOINT")?,
            media_bucket: std::env::var("MEDIA_BUCKET")?,
            media_access_key: std::env::var("MEDIA_ACCESS_KEY")?,
            media_secret_key: std::env::var("MEDIA_SECRET_KEY")?,
        })
    }
}

#[cfg(test)]
mod ttl_tests {
    use super::positive_days;

    #[test]
    fn rejects_negative_zero_and_junk() {
        std::env::set_var("TEST_TTL_DAYS", "-3");
        assert_eq!(positive_days("TEST_TTL_DAYS"), None);
        std::env::set_var("TEST_TTL_DAYS", "0");
        assert_eq!(positive_days("TEST_TTL_DAYS"), None);
        std::env::set_var("TEST_TTL_DAYS", "soon");
        assert_eq!(positive_days("TEST_TTL_DAYS"), None);
        std::env::remove_var("TEST_TTL_DAYS");
        assert_eq!(positive_days("TEST_TTL_DAYS"), None);
    }

    #[test]
    fn accepts_whole_day_counts() {
        std::env::set_var("TEST_TTL_DAYS_OK", "14");
        assert_eq!(positive_days("TEST_TTL_DAYS_OK"), Some(14));
        std::env::remove_var("TEST_TTL_DAYS_OK");
    }
}
