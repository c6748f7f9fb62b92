use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{from_value, to_value, Document, DocumentCollection, Filter, Mutation};
use crate::errors::ServiceError;

/// Ordered set of JSON documents shared by the in-memory and file backends.
#[derive(Debug, Default, Clone)]
pub(crate) struct DocumentSet {
    docs: Vec<Value>,
}

impl DocumentSet {
    pub(crate) fn from_values(docs: Vec<Value>) -> Self { Self { docs } }

    pub(crate) fn values(&self) -> &[Value] { &self.docs }

    pub(crate) fn find_one<D: Document>(&self, filter: &Filter) -> Result<Option<D>, ServiceError> {
        self.docs.iter().find(|d| filter.matches(d)).map(from_value).transpose()
    }

    pub(crate) fn find_all<D: Document>(&self) -> Result<Vec<D>, ServiceError> {
        self.docs.iter().map(from_value).collect()
    }

    pub(crate) fn insert<D: Document>(&mut self, doc: &D) -> Result<(), ServiceError> {
        let value = to_value(doc)?;
        if !value.is_object() {
            return Err(ServiceError::Validation("document must serialize to an object".into()));
        }
        self.docs.push(value);
        Ok(())
    }

    pub(crate) fn update(&mut self, filter: &Filter, mutation: &Mutation) -> Result<u64, ServiceError> {
        let Some(slot) = self.docs.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(0);
        };
        let mut next = slot.clone();
        mutation.apply(&mut next)?;
        *slot = next;
        Ok(1)
    }

    pub(crate) fn delete(&mut self, filter: &Filter) -> u64 {
        match self.docs.iter().position(|d| filter.matches(d)) {
            Some(idx) => {
                self.docs.remove(idx);
                1
            }
            None => 0,
        }
    }
}

/// In-process collection. Contents are lost when the process exits.
pub struct MemoryCollection<D> {
    inner: RwLock<DocumentSet>,
    _doc: PhantomData<fn() -> D>,
}

impl<D: Document> Default for MemoryCollection<D> {
    fn default() -> Self {
        Self { inner: RwLock::new(DocumentSet::default()), _doc: PhantomData }
    }
}

impl<D: Document> MemoryCollection<D> {
    pub fn new() -> Self { Self::default() }

    /// Pre-populate with existing documents, e.g. to model records surviving a restart.
    pub fn with_documents(docs: impl IntoIterator<Item = D>) -> Result<Self, ServiceError> {
        let mut set = DocumentSet::default();
        for doc in docs {
            set.insert(&doc)?;
        }
        Ok(Self { inner: RwLock::new(set), _doc: PhantomData })
    }
}

#[async_trait]
impl<D: Document> DocumentCollection<D> for MemoryCollection<D> {
    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, ServiceError> {
        self.inner.read().await.find_one(filter)
    }

    async fn find_all(&self) -> Result<Vec<D>, ServiceError> {
        self.inner.read().await.find_all()
    }

    async fn insert(&self, doc: D) -> Result<(), ServiceError> {
        self.inner.write().await.insert(&doc)
    }

    async fn update(&self, filter: &Filter, mutation: &Mutation) -> Result<u64, ServiceError> {
        self.inner.write().await.update(filter, mutation)
    }

    async fn delete(&self, filter: &Filter) -> Result<u64, ServiceError> {
        Ok(self.inner.write().await.delete(filter))
    }
}
