use std::time::Duration;

/// Connection settings for the Transunion lead endpoint.
///
/// Passed explicitly to [`crate::transunion_client::TransunionClient`] so tests
/// can point it at a mock server.
#[derive(Debug, Clone)]
pub struct TransunionConfig {
    pub endpoint_url: String,
    /// Extra headers sent on every request, on top of the JSON content headers.
    pub headers: Vec<(String, String)>,
    /// `None` leaves the request without a timeout.
    pub timeout: Option<Duration>,
}

impl TransunionConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the settings from raw variable values.
    ///
    /// Blank `timeout_secs` or `api_key` count as unset. The API key is sent
    /// as `x-api-key`.
    pub fn from_parts(
        endpoint_url: String,
        timeout_secs: Option<&str>,
        api_key: Option<&str>,
    ) -> anyhow::Result<Self> {
        validate_endpoint_url(&endpoint_url)?;
        let mut config = Self::new(endpoint_url);

        if let Some(secs) = timeout_secs.map(str::trim).filter(|s| !s.is_empty()) {
            let secs: u64 = secs
                .parse()
                .map_err(|_| anyhow::anyhow!("TU_TIMEOUT_SECS must be a whole number of seconds"))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(key) = api_key.filter(|s| !s.trim().is_empty()) {
            config = config.with_header("x-api-key", key);
        }

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub transunion: TransunionConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let endpoint_url = std::env::var("TU_ENDPOINT_URL")
            .map_err(|_| anyhow::anyhow!("TU_ENDPOINT_URL environment variable required"))?;

        let transunion = TransunionConfig::from_parts(
            endpoint_url,
            std::env::var("TU_TIMEOUT_SECS").ok().as_deref(),
            std::env::var("TU_API_KEY").ok().as_deref(),
        )?;

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            transunion,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Transunion endpoint: {}", config.transunion.endpoint_url);
        tracing::debug!("Transunion timeout: {:?}", config.transunion.timeout);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// Checks that the endpoint is a non-empty absolute http(s) URL.
pub fn validate_endpoint_url(url: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("TU_ENDPOINT_URL cannot be empty");
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("TU_ENDPOINT_URL must start with http:// or https://");
    }
    url::Url::parse(url).map_err(|e| anyhow::anyhow!("TU_ENDPOINT_URL is not a valid URL: {}", e))?;
    Ok(())
}
