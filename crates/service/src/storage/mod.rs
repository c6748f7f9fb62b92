//! Document store collaborator.
//!
//! The blog and credential stores only ever talk to their backing collection
//! through [`DocumentCollection`]: five primitives over JSON-shaped documents,
//! addressed by field-equality [`Filter`]s and changed by single-field
//! [`Mutation`]s. Each backend serializes its own primitives; callers needing a
//! read-modify-write span provide their own guard.

pub mod json_file;
pub mod memory;
pub mod query;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::ServiceError;

pub use json_file::JsonFileCollection;
pub use memory::MemoryCollection;
pub use query::{Filter, Mutation};

/// Anything storable in a collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Document for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Trait abstraction over one named collection of documents.
/// Implementations can be in-memory, file-backed, or a remote document database.
#[async_trait]
pub trait DocumentCollection<D: Document>: Send + Sync {
    /// First document matching `filter`, in insertion order.
    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, ServiceError>;

    /// Every document, in insertion order.
    async fn find_all(&self) -> Result<Vec<D>, ServiceError>;

    async fn insert(&self, doc: D) -> Result<(), ServiceError>;

    /// Apply `mutation` to the first match; returns the number of documents matched (0 or 1).
    async fn update(&self, filter: &Filter, mutation: &Mutation) -> Result<u64, ServiceError>;

    /// Remove the first match; returns the number of documents removed (0 or 1).
    async fn delete(&self, filter: &Filter) -> Result<u64, ServiceError>;
}

pub(crate) fn to_value<D: Document>(doc: &D) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(doc).map_err(ServiceError::unavailable)
}

pub(crate) fn from_value<D: Document>(value: &serde_json::Value) -> Result<D, ServiceError> {
    <D as serde::Deserialize>::deserialize(value).map_err(ServiceError::unavailable)
}
