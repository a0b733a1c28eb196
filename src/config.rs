//! Client configuration for the PubMed E-utilities endpoints.

use std::time::Duration;

use crate::rate_limit::RateLimiter;
use crate::retry::RetryConfig;

/// Default E-utilities base URL.
const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Identity reported to NCBI via the `tool` parameter on every request.
const DEFAULT_TOOL: &str = "dfhcc_informatics";

/// NCBI request budget without an API key (requests/second).
const DEFAULT_RATE_LIMIT: f64 = 3.0;

/// NCBI request budget with an API key (requests/second).
const API_KEY_RATE_LIMIT: f64 = 10.0;

/// Configuration for [`PubMedClient`](crate::PubMedClient).
///
/// All settings have NCBI-friendly defaults; builder methods override
/// them individually.
///
/// # Example
///
/// ```
/// use pubmed_search::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_api_key("your_api_key_here")
///     .with_email("researcher@university.edu");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    email: Option<String>,
    tool: Option<String>,
    rate_limit: Option<f64>,
    /// HTTP timeout applied to every request
    pub timeout: Duration,
    /// Retry budget applied to every request
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            email: None,
            tool: None,
            rate_limit: None,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    /// Override the E-utilities base URL (primarily for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Set an NCBI API key, raising the default rate limit to 10 rps.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the contact email reported to NCBI.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Override the `tool` identity string.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Override the request rate (requests per second).
    pub fn with_rate_limit(mut self, rate: f64) -> Self {
        self.rate_limit = Some(rate);
        self
    }

    /// Override the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry budget.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Base URL in effect, configured or default.
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// `tool` identity in effect, configured or default.
    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    /// Request rate in effect: explicit setting, else the NCBI default
    /// for the key-less or keyed tier.
    pub fn effective_rate_limit(&self) -> f64 {
        match self.rate_limit {
            Some(rate) => rate,
            None if self.api_key.is_some() => API_KEY_RATE_LIMIT,
            None => DEFAULT_RATE_LIMIT,
        }
    }

    /// User agent string sent with every request.
    pub fn effective_user_agent(&self) -> String {
        format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Identity parameters (`tool`, `email`, `api_key`) appended to
    /// every request URL.
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("tool".to_string(), self.effective_tool().to_string())];
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        if let Some(api_key) = &self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }
        params
    }

    /// Build the rate limiter matching this configuration.
    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
