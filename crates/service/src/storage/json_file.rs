use std::{io::ErrorKind, marker::PhantomData, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};

use super::memory::DocumentSet;
use super::{Document, DocumentCollection, Filter, Mutation};
use crate::errors::ServiceError;

/// JSON file-backed document collection.
///
/// Keeps the documents in memory and rewrites `<path>` as a JSON array after
/// every successful write. Intended for single-process deployments where an
/// external document database is overkill.
pub struct JsonFileCollection<D> {
    inner: RwLock<DocumentSet>,
    file_path: PathBuf,
    _doc: PhantomData<fn() -> D>,
}

impl<D: Document> JsonFileCollection<D> {
    /// Open the collection at `path`. Creates the file with an empty array if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let docs: Vec<Value> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                warn!(path = %file_path.display(), error = %e, "collection file is not a JSON array");
                ServiceError::unavailable(e)
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&file_path, b"[]").await.map_err(ServiceError::unavailable)?;
                Vec::new()
            }
            Err(e) => {
                warn!(path = %file_path.display(), error = %e, "collection file is unreadable");
                return Err(ServiceError::unavailable(e));
            }
        };
        debug!(path = %file_path.display(), count = docs.len(), "collection opened");

        Ok(Arc::new(Self {
            inner: RwLock::new(DocumentSet::from_values(docs)),
            file_path,
            _doc: PhantomData,
        }))
    }

    /// Persist through a temp file and rename so readers never see a torn file.
    /// Called with the write lock held, so file order matches memory order.
    async fn save(&self, set: &DocumentSet) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(set.values()).map_err(ServiceError::unavailable)?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(ServiceError::unavailable)?;
        fs::rename(&tmp, &self.file_path).await.map_err(ServiceError::unavailable)?;
        Ok(())
    }

    /// Apply a write to the in-memory set and persist it. If persisting fails the
    /// in-memory set is rolled back so memory and disk stay in step.
    async fn write_with<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut DocumentSet) -> Result<(T, bool), ServiceError>,
    {
        let mut set = self.inner.write().await;
        let before = (*set).clone();
        let (out, changed) = f(&mut *set)?;
        if changed {
            if let Err(e) = self.save(&*set).await {
                *set = before;
                return Err(e);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl<D: Document> DocumentCollection<D> for JsonFileCollection<D> {
    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, ServiceError> {
        self.inner.read().await.find_one(filter)
    }

    async fn find_all(&self) -> Result<Vec<D>, ServiceError> {
        self.inner.read().await.find_all()
    }

    async fn insert(&self, doc: D) -> Result<(), ServiceError> {
        self.write_with(|set| set.insert(&doc).map(|_| ((), true))).await
    }

    async fn update(&self, filter: &Filter, mutation: &Mutation) -> Result<u64, ServiceError> {
        self.write_with(|set| set.update(filter, mutation).map(|n| (n, n > 0))).await
    }

    async fn delete(&self, filter: &Filter) -> Result<u64, ServiceError> {
        self.write_with(|set| {
            let n = set.delete(filter);
            Ok((n, n > 0))
        })
        .await
    }
}
