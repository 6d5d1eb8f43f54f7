/// Deployment mode. Production refuses to start without a shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "development" | "dev" | "local" => Ok(Self::Development),
            "test" | "testing" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => anyhow::bail!(
                "ENVIRONMENT must be one of development, test, production (got '{}')",
                other
            ),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout_secs: u64,
    /// Shared secret expected in the `X-API-Key` header. `None` disables the gate.
    pub master_api_key: Option<String>,
}

impl Config {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Environment::parse(&std::env::var("ENVIRONMENT").unwrap_or_default())?;

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            environment,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("OPENAI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            openai_base_url: validate_base_url(
                std::env::var("OPENAI_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            )?,
            openai_model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            openai_timeout_secs: std::env::var("OPENAI_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .ok()
                .filter(|secs: &u64| *secs > 0)
                .ok_or_else(|| anyhow::anyhow!("OPENAI_TIMEOUT_SECS must be a positive integer"))?,
            master_api_key: std::env::var("MASTER_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        config.check_secret_policy()?;

        // Never log secrets, only whether they are present
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Environment: {:?}", config.environment);
        tracing::debug!("OpenAI base URL: {}", config.openai_base_url);
        tracing::debug!("OpenAI model: {}", config.openai_model);
        tracing::debug!("Server Port: {}", config.port);
        if config.master_api_key.is_none() {
            tracing::warn!("MASTER_API_KEY not set: API key check is disabled (non-production only)");
        }

        Ok(config)
    }

    /// A missing shared secret is tolerated everywhere except production.
    pub fn check_secret_policy(&self) -> anyhow::Result<()> {
        if self.environment.is_production() && self.master_api_key.is_none() {
            anyhow::bail!("MASTER_API_KEY is required when ENVIRONMENT=production");
        }
        Ok(())
    }

    /// Minimal configuration pointing the model client at `base_url`.
    pub fn for_tests(base_url: impl Into<String>, master_api_key: Option<&str>) -> Self {
        Self {
            port: 0,
            environment: Environment::Test,
            openai_api_key: "test-openai-key".to_string(),
            openai_base_url: base_url.into(),
            openai_model: Self::DEFAULT_MODEL.to_string(),
            openai_timeout_secs: 5,
            master_api_key: master_api_key.map(str::to_string),
        }
    }
}

fn validate_base_url(raw: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(&raw)
        .map_err(|e| anyhow::anyhow!("OPENAI_BASE_URL is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("OPENAI_BASE_URL must start with http:// or https://");
    }
    Ok(raw.trim_end_matches('/').to_string())
}
