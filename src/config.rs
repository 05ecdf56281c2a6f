use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_days: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub session: SessionConfig,
}

impl AppConfig {
    /// Reads configuration once at startup. There is deliberately no fallback
    /// signing secret: a process without `SESSION_SECRET` refuses to boot.
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("SESSION_SECRET").map_err(|_| {
            anyhow::anyhow!("SESSION_SECRET must be set; refusing to start without a signing secret")
        })?;
        if secret.trim().is_empty() {
            anyhow::bail!("SESSION_SECRET must not be empty");
        }
        let session = SessionConfig {
            secret,
            ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
            cookie_secure: std::env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        };
        Ok(Self { session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // env vars are process-global, so the positive and negative cases share
    // one test instead of racing each other
    #[test]
    fn from_env_requires_session_secret() {
        std::env::remove_var("SESSION_SECRET");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));

        std::env::set_var("SESSION_SECRET", "unit-test-secret");
        std::env::remove_var("SESSION_TTL_DAYS");
        std::env::remove_var("APP_ENV");
        let config = AppConfig::from_env().expect("config should load");
        assert_eq!(config.session.secret, "unit-test-secret");
        assert_eq!(config.session.ttl_days, 7);
        assert!(!config.session.cookie_secure);
        std::env::remove_var("SESSION_SECRET");
    }
}
