use std::time::Duration;

/// API base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5055";

/// Name of the `<meta>` tag through which the server hands the API base URL to the client.
pub const API_URL_META: &str = "api-base-url";

/// How often an open contest view re-evaluates the contest status.
pub const STATUS_REFRESH: Duration = Duration::from_secs(60);

/// Where the judge API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig::new(option_env!("API_URL").unwrap_or(DEFAULT_API_URL))
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
            };
        }
        ApiConfig { base_url }
    }

    /// Joins an absolute API path such as `/api/problems` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Reads `API_URL` from the environment (and `.env`), falling back to the default.
    #[cfg(feature = "ssr")]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        match std::env::var("API_URL") {
            Ok(url) => ApiConfig::new(url),
            Err(_) => ApiConfig::default(),
        }
    }

    /// Reads the base URL the server published in the page head.
    #[cfg(feature = "hydrate")]
    pub fn from_document() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let meta = document
            .query_selector(&format!("meta[name=\"{}\"]", API_URL_META))
            .ok()??;
        meta.get_attribute("content")
            .filter(|url| !url.trim().is_empty())
            .map(ApiConfig::new)
    }

    /// Resolves the configuration for whichever side is running.
    pub fn discover() -> Self {
        #[cfg(feature = "hydrate")]
        if let Some(config) = ApiConfig::from_document() {
            return config;
        }
        #[cfg(feature = "ssr")]
        {
            ApiConfig::from_env()
        }
        #[cfg(not(feature = "ssr"))]
        {
            ApiConfig::default()
        }
    }
}
