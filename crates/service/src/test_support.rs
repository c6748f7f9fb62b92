#![cfg(test)]
use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::storage::{Document, DocumentCollection, Filter, Mutation};

/// Collection whose backend can never be reached.
pub struct UnavailableCollection;

fn down() -> ServiceError {
    ServiceError::unavailable("connection refused")
}

#[async_trait]
impl<D: Document> DocumentCollection<D> for UnavailableCollection {
    async fn find_one(&self, _filter: &Filter) -> Result<Option<D>, ServiceError> { Err(down()) }
    async fn find_all(&self) -> Result<Vec<D>, ServiceError> { Err(down()) }
    async fn insert(&self, _doc: D) -> Result<(), ServiceError> { Err(down()) }
    async fn update(&self, _filter: &Filter, _mutation: &Mutation) -> Result<u64, ServiceError> { Err(down()) }
    async fn delete(&self, _filter: &Filter) -> Result<u64, ServiceError> { Err(down()) }
}
