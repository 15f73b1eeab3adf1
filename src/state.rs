use crate::config::AppConfig;
use crate::storage::{HttpRecordStore, MemoryRecordStore, RecordStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub records: Arc<dyn RecordStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let records = match &config.crud.base_url {
            Some(base_url) => {
                tracing::info!(%base_url, "using hosted crud service");
                Arc::new(HttpRecordStore::new(base_url, &config.crud)?) as Arc<dyn RecordStore>
            }
            None => {
                tracing::warn!("CRUD_BASE_URL not set; records live in memory and vanish on restart");
                Arc::new(MemoryRecordStore::new()) as Arc<dyn RecordStore>
            }
        };

        Ok(Self::from_parts(config, records))
    }

    pub fn from_parts(config: Arc<AppConfig>, records: Arc<dyn RecordStore>) -> Self {
        Self { config, records }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::with_records(Arc::new(MemoryRecordStore::new()))
    }

    #[cfg(test)]
    pub fn with_records(records: Arc<dyn RecordStore>) -> Self {
        use crate::config::CrudConfig;

        let config = Arc::new(AppConfig {
            crud: CrudConfig {
                base_url: None,
                api_key: None,
                timeout_secs: 1,
            },
            cookie_secure: false,
        });
        Self::from_parts(config, records)
    }
}
