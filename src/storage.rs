use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::config::CrudConfig;
use crate::students::dto::{StudentFields, StudentRecord};

/// The external CRUD service holding student records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_all(&self, collection: &str) -> anyhow::Result<Vec<StudentRecord>>;
    async fn get_by_id(&self, collection: &str, id: &str) -> anyhow::Result<StudentRecord>;
    async fn create(&self, collection: &str, fields: &StudentFields) -> anyhow::Result<StudentRecord>;
    async fn update(&self, collection: &str, record: &StudentRecord) -> anyhow::Result<StudentRecord>;
    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()>;
}

/// Items are decoded one by one so a single malformed record does not hide the rest.
#[derive(Deserialize)]
struct ItemsPage {
    items: Vec<serde_json::Value>,
}

impl ItemsPage {
    fn into_records(self) -> Vec<StudentRecord> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let id = item
                    .get("_id")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                match serde_json::from_value(item) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(%id, error = %e, "skipping malformed record");
                        None
                    }
                }
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpRecordStore {
    pub fn new(base_url: &str, config: &CrudConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;
        let base_url = Url::parse(base_url).with_context(|| format!("invalid crud base url {base_url}"))?;
        anyhow::ensure!(!base_url.cannot_be_a_base(), "crud base url {base_url} cannot hold a path");
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Appends `collections/{segments..}` to the base url. Every segment is percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("collections").extend(segments);
        }
        url
    }

    fn items_url(&self, collection: &str) -> Url {
        self.url(&[collection, "items"])
    }

    fn item_url(&self, collection: &str, id: &str) -> anyhow::Result<Url> {
        anyhow::ensure!(
            !matches!(id.trim(), "" | "." | ".."),
            "invalid record id {id:?}"
        );
        Ok(self.url(&[collection, "items", id]))
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        what: &str,
    ) -> anyhow::Result<reqwest::Response> {
        let res = self
            .authorized(req)
            .send()
            .await
            .with_context(|| format!("crud {what}: request failed"))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("crud {what}: {status}: {body}");
        }
        Ok(res)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn get_all(&self, collection: &str) -> anyhow::Result<Vec<StudentRecord>> {
        let res = self
            .send(self.client.get(self.items_url(collection)), "get_all")
            .await?;
        let page: ItemsPage = res.json().await.context("crud get_all: decode")?;
        Ok(page.into_records())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> anyhow::Result<StudentRecord> {
        let res = self
            .send(self.client.get(self.item_url(collection, id)?), "get_by_id")
            .await?;
        res.json().await.context("crud get_by_id: decode")
    }

    async fn create(&self, collection: &str, fields: &StudentFields) -> anyhow::Result<StudentRecord> {
        let res = self
            .send(self.client.post(self.items_url(collection)).json(fields), "create")
            .await?;
        res.json().await.context("crud create: decode")
    }

    async fn update(&self, collection: &str, record: &StudentRecord) -> anyhow::Result<StudentRecord> {
        let res = self
            .send(
                self.client.put(self.item_url(collection, &record.id)?).json(record),
                "update",
            )
            .await?;
        res.json().await.context("crud update: decode")
    }

    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()> {
        self.send(self.client.delete(self.item_url(collection, id)?), "delete")
            .await?;
        Ok(())
    }
}

/// In-process stand-in for the CRUD service. Assigns ids and timestamps like the real one.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<(String, StudentRecord)>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_all(&self, collection: &str) -> anyhow::Result<Vec<StudentRecord>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> anyhow::Result<StudentRecord> {
        let rows = self.rows.read().await;
        rows.iter()
            .find(|(c, r)| c == collection && r.id == id)
            .map(|(_, r)| r.clone())
            .with_context(|| format!("record {id} not found in {collection}"))
    }

    async fn create(&self, collection: &str, fields: &StudentFields) -> anyhow::Result<StudentRecord> {
        let now = OffsetDateTime::now_utc();
        let record = StudentRecord {
            id: Uuid::new_v4().to_string(),
            created_date: Some(now),
            updated_date: Some(now),
            fields: fields.clone(),
        };
        self.rows
            .write()
            .await
            .push((collection.to_string(), record.clone()));
        Ok(record)
    }

    async fn update(&self, collection: &str, record: &StudentRecord) -> anyhow::Result<StudentRecord> {
        let mut rows = self.rows.write().await;
        let stored = rows
            .iter_mut()
            .find(|(c, r)| c == collection && r.id == record.id)
            .map(|(_, r)| r)
            .with_context(|| format!("record {} not found in {collection}", record.id))?;
        stored.fields = record.fields.clone();
        stored.updated_date = Some(OffsetDateTime::now_utc());
        Ok(stored.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|(c, r)| !(c == collection && r.id == id));
        anyhow::ensure!(rows.len() < before, "record {id} not found in {collection}");
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Wraps a store and counts every call that reaches it.
    #[derive(Default)]
    pub struct CountingStore {
        pub inner: MemoryRecordStore,
        calls: AtomicUsize,
        pub fail: bool,
    }

    impl CountingStore {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::ensure!(!self.fail, "crud service unavailable");
            Ok(())
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn get_all(&self, collection: &str) -> anyhow::Result<Vec<StudentRecord>> {
            self.hit()?;
            self.inner.get_all(collection).await
        }
        async fn get_by_id(&self, collection: &str, id: &str) -> anyhow::Result<StudentRecord> {
            self.hit()?;
            self.inner.get_by_id(collection, id).await
        }
        async fn create(&self, collection: &str, fields: &StudentFields) -> anyhow::Result<StudentRecord> {
            self.hit()?;
            self.inner.create(collection, fields).await
        }
        async fn update(&self, collection: &str, record: &StudentRecord) -> anyhow::Result<StudentRecord> {
            self.hit()?;
            self.inner.update(collection, record).await
        }
        async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()> {
            self.hit()?;
            self.inner.delete(collection, id).await
        }
    }
}
