//! Service layer: the concurrent mutation core of the blog repository.
//! - `storage` is the document store collaborator the stores are written against.
//! - `blog` and `auth` own one collection each and serialize access to it.
//! - Errors are reported through one taxonomy in `errors`.

pub mod errors;
pub mod auth;
pub mod blog;
pub mod metrics;
pub mod runtime;
pub mod storage;
#[cfg(test)]
pub mod test_support;
