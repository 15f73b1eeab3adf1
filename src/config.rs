use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CrudConfig {
    /// Base URL of the hosted CRUD service. `None` selects the in-memory store.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub crud: CrudConfig,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let crud = CrudConfig {
            base_url: std::env::var("CRUD_BASE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
            api_key: std::env::var("CRUD_API_KEY").ok().filter(|v| !v.is_empty()),
            timeout_secs: std::env::var("CRUD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);
        Ok(Self { crud, cookie_secure })
    }
}
