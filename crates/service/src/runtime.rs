//! Runtime wiring
//!
//! Opens the `blogs` and `users` collections on the configured backend and
//! builds the two stores over them.

use std::{path::Path, sync::Arc};

use configs::{StorageBackend, StorageConfig};
use models::{Blog, User};
use tracing::info;

use crate::auth::CredentialStore;
use crate::blog::BlogStore;
use crate::storage::{DocumentCollection, JsonFileCollection, MemoryCollection};

pub const BLOGS_COLLECTION: &str = "blogs";
pub const USERS_COLLECTION: &str = "users";

/// The two stores a running server shares between requests.
#[derive(Clone)]
pub struct Stores {
    pub blogs: Arc<BlogStore>,
    pub users: Arc<CredentialStore>,
}

impl Stores {
    /// Both stores over fresh in-memory collections.
    pub fn in_memory() -> Self {
        Self {
            blogs: Arc::new(BlogStore::new(Arc::new(MemoryCollection::<Blog>::new()))),
            users: Arc::new(CredentialStore::new(Arc::new(MemoryCollection::<User>::new()))),
        }
    }
}

/// Ensure expected directories exist for the file backend.
pub async fn ensure_env(cfg: &StorageConfig) -> anyhow::Result<()> {
    if cfg.backend == StorageBackend::File {
        common::env::ensure_data_dir(&cfg.data_dir).await?;
    }
    Ok(())
}

pub async fn open_stores(cfg: &StorageConfig) -> anyhow::Result<Stores> {
    let blogs: Arc<dyn DocumentCollection<Blog>>;
    let users: Arc<dyn DocumentCollection<User>>;
    match cfg.backend {
        StorageBackend::Memory => {
            blogs = Arc::new(MemoryCollection::<Blog>::new());
            users = Arc::new(MemoryCollection::<User>::new());
        }
        StorageBackend::File => {
            let dir = Path::new(&cfg.data_dir);
            blogs = JsonFileCollection::<Blog>::open(dir.join(format!("{BLOGS_COLLECTION}.json"))).await?;
            users = JsonFileCollection::<User>::open(dir.join(format!("{USERS_COLLECTION}.json"))).await?;
        }
    }

    let blog_store = if cfg.resume_ids {
        BlogStore::resume(blogs).await?
    } else {
        BlogStore::new(blogs)
    };
    info!(backend = ?cfg.backend, data_dir = %cfg.data_dir, resume_ids = cfg.resume_ids, "stores opened");

    Ok(Stores { blogs: Arc::new(blog_store), users: Arc::new(CredentialStore::new(users)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::BlogDraft;

    fn file_cfg(resume_ids: bool) -> StorageConfig {
        let dir = std::env::temp_dir().join(format!("blog_repo_rt_{}", uuid::Uuid::new_v4()));
        StorageConfig { backend: StorageBackend::File, data_dir: dir.to_string_lossy().to_string(), resume_ids }
    }

    #[tokio::test]
    async fn file_backend_keeps_records_but_restarts_ids() -> anyhow::Result<()> {
        let cfg = file_cfg(false);
        ensure_env(&cfg).await?;

        let stores = open_stores(&cfg).await?;
        stores.blogs.create(BlogDraft::new("a", "", "")).await?;
        stores.users.signup(User::new("u", "p")).await?;
        drop(stores);

        let reopened = open_stores(&cfg).await?;
        assert_eq!(reopened.blogs.list().await?.len(), 1);
        reopened.users.login(User::new("u", "p")).await?;
        assert_eq!(reopened.blogs.create(BlogDraft::new("b", "", "")).await?.id, 1);

        let _ = tokio::fs::remove_dir_all(&cfg.data_dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn resume_ids_continues_numbering_after_reopen() -> anyhow::Result<()> {
        let cfg = file_cfg(true);
        ensure_env(&cfg).await?;

        let stores = open_stores(&cfg).await?;
        stores.blogs.create(BlogDraft::new("a", "", "")).await?;
        stores.blogs.create(BlogDraft::new("b", "", "")).await?;
        drop(stores);

        let reopened = open_stores(&cfg).await?;
        assert_eq!(reopened.blogs.create(BlogDraft::new("c", "", "")).await?.id, 3);

        let _ = tokio::fs::remove_dir_all(&cfg.data_dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn memory_backend_needs_no_directory() -> anyhow::Result<()> {
        let cfg = StorageConfig { backend: StorageBackend::Memory, data_dir: String::new(), resume_ids: false };
        ensure_env(&cfg).await?;
        let stores = open_stores(&cfg).await?;
        assert!(stores.blogs.list().await?.is_empty());
        Ok(())
    }
}
