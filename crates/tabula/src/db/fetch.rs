use super::Db;
use crate::{Result, SelectOptions, Statement};

use tabula_core::{
    stmt::{Key, Record},
    Error,
};

impl Db {
    /// Fetches the record of `source` with primary key `key`.
    ///
    /// More than one matching row is logged as a warning and the first row
    /// is returned.
    pub async fn fetch(&self, source: &str, key: impl Into<Key>) -> Result<Option<Record>> {
        let key = key.into();
        let source = self.schema().source(source)?.clone();
        let filter = self.schema().primary_key_filter(&source, &key)?;

        let mut stmt = Statement::new(self.clone(), source.clone());
        stmt.refine(SelectOptions::new().filter(filter))?;

        let first = stmt.next().await?;
        if first.is_some() && stmt.next().await?.is_some() {
            let err = Error::too_many_records(format!("{}.fetch({})", source.name, key_text(&key)));
            tracing::warn!(%err, "fetch matched more than one record; returning the first");
        }
        Ok(first)
    }

    /// Like [`fetch`](Self::fetch), memoized per connection, source and
    /// key. Misses are cached too.
    pub async fn fetch_cached(&self, source: &str, key: impl Into<Key>) -> Result<Option<Record>> {
        let key = key.into();
        let cache_key = (self.shared.id, source.to_string());

        if let Some(cached) = self.cache_lookup(&cache_key, &key) {
            let key = key_text(&key);
            tracing::trace!(source, %key, "fetch cache hit");
            return Ok(cached);
        }

        let record = self.fetch(source, key.clone()).await?;
        if let Ok(mut cache) = self.shared.catalog.fetch_cache.lock() {
            cache.entry(cache_key).or_default().push((key, record.clone()));
        }
        Ok(record)
    }

    /// Forgets every record memoized by `fetch_cached`, for every
    /// connection sharing this schema.
    pub fn clear_fetch_cache(&self) {
        if let Ok(mut cache) = self.shared.catalog.fetch_cache.lock() {
            cache.clear();
        }
    }

    fn cache_lookup(&self, cache_key: &(super::ConnectionId, String), key: &Key) -> Option<Option<Record>> {
        let cache = self.shared.catalog.fetch_cache.lock().ok()?;
        cache
            .get(cache_key)?
            .iter()
            .find(|(cached, _)| cached == key)
            .map(|(_, record)| record.clone())
    }
}

fn key_text(key: &Key) -> String {
    key.values()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
