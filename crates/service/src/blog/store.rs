use std::sync::Arc;

use models::{Blog, BlogDraft, BlogId, Comment};
use tokio::sync::RwLock;
use tracing::{info, instrument, trace, warn};

use crate::errors::ServiceError;
use crate::metrics;
use crate::storage::{DocumentCollection, Filter, Mutation};

/// State guarded together with the collection. Holding the write half is the
/// only way to touch the id counter.
#[derive(Debug, Default)]
struct BlogState {
    last_id: BlogId,
}

/// Blog business store independent of web framework.
///
/// All five operations serialize on one reader/writer guard scoped to the whole
/// collection: `list` takes it shared, every mutation takes it exclusive for the
/// full read-modify-write span. The guard is FIFO-fair, so operations on the
/// same blog apply in arrival order.
pub struct BlogStore {
    docs: Arc<dyn DocumentCollection<Blog>>,
    state: RwLock<BlogState>,
}

impl BlogStore {
    /// Counter starts at 0, so the first blog gets id 1. Ids are not derived
    /// from existing records: reopening a persistent collection can hand out
    /// ids that are already stored. See [`BlogStore::resume`].
    pub fn new(docs: Arc<dyn DocumentCollection<Blog>>) -> Self {
        Self { docs, state: RwLock::new(BlogState::default()) }
    }

    /// Seed the counter from the largest id already in the collection.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::BlogDraft;
    /// use service::blog::BlogStore;
    /// use service::storage::MemoryCollection;
    ///
    /// let docs = MemoryCollection::with_documents([BlogDraft::new("old", "c", "a").into_blog(41)]).unwrap();
    /// let store = tokio_test::block_on(BlogStore::resume(Arc::new(docs))).unwrap();
    /// let blog = tokio_test::block_on(store.create(BlogDraft::new("new", "c", "a"))).unwrap();
    /// assert_eq!(blog.id, 42);
    /// ```
    pub async fn resume(docs: Arc<dyn DocumentCollection<Blog>>) -> Result<Self, ServiceError> {
        let last_id = docs.find_all().await?.iter().map(|b| b.id).max().unwrap_or(0);
        info!(last_id, "blog id counter resumed from store");
        Ok(Self { docs, state: RwLock::new(BlogState { last_id }) })
    }

    /// Every stored blog, in insertion order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Blog>, ServiceError> {
        let _guard = self.state.read().await;
        trace!("blogs guard acquired (shared)");
        let res = self.docs.find_all().await;
        if let Err(e) = &res {
            warn!(error = %e, "listing blogs failed");
        }
        metrics::record("list_blogs", &res);
        res
    }

    /// Store `draft` under the next id and return the stored blog.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::{Blog, BlogDraft};
    /// use service::blog::BlogStore;
    /// use service::storage::MemoryCollection;
    ///
    /// let store = BlogStore::new(Arc::new(MemoryCollection::<Blog>::new()));
    /// let blog = tokio_test::block_on(store.create(BlogDraft::new("T", "C", "X"))).unwrap();
    /// assert_eq!(blog.id, 1);
    /// assert_eq!(blog.likes, 0);
    /// assert!(blog.comments.is_empty());
    /// ```
    #[instrument(skip(self, draft), fields(title = %draft.title, author = %draft.author))]
    pub async fn create(&self, draft: BlogDraft) -> Result<Blog, ServiceError> {
        let res = self.create_locked(draft).await;
        metrics::record("create_blog", &res);
        res
    }

    async fn create_locked(&self, draft: BlogDraft) -> Result<Blog, ServiceError> {
        let mut state = self.state.write().await;
        trace!("blogs guard acquired (exclusive)");
        // an id is consumed even if the insert fails; it is never handed out twice
        state.last_id += 1;
        let blog = draft.into_blog(state.last_id);
        self.docs.insert(blog.clone()).await.map_err(|e| {
            warn!(id = blog.id, error = %e, "blog insert failed");
            e
        })?;
        info!(id = blog.id, "blog_created");
        Ok(blog)
    }

    /// Add exactly one like to blog `id`.
    #[instrument(skip(self))]
    pub async fn like(&self, id: BlogId) -> Result<(), ServiceError> {
        let res = self.mutate(id, Mutation::inc("likes", 1)).await;
        if res.is_ok() {
            info!(id, "blog_liked");
        }
        metrics::record("like_blog", &res);
        res
    }

    /// Append `comment` to the end of blog `id`'s comments.
    #[instrument(skip(self, comment), fields(comment_author = %comment.author))]
    pub async fn comment(&self, id: BlogId, comment: Comment) -> Result<(), ServiceError> {
        let res = match Mutation::push("comments", &comment) {
            Ok(push) => self.mutate(id, push).await,
            Err(e) => Err(e),
        };
        if res.is_ok() {
            info!(id, "blog_commented");
        }
        metrics::record("comment_blog", &res);
        res
    }

    /// Remove blog `id` together with its comments.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: BlogId) -> Result<(), ServiceError> {
        let res = self.delete_locked(id).await;
        metrics::record("delete_blog", &res);
        res
    }

    async fn delete_locked(&self, id: BlogId) -> Result<(), ServiceError> {
        let _guard = self.state.write().await;
        trace!("blogs guard acquired (exclusive)");
        match self.docs.delete(&Filter::eq("id", id)).await? {
            0 => Err(ServiceError::not_found("blog")),
            _ => {
                info!(id, "blog_deleted");
                Ok(())
            }
        }
    }

    async fn mutate(&self, id: BlogId, mutation: Mutation) -> Result<(), ServiceError> {
        let _guard = self.state.write().await;
        trace!("blogs guard acquired (exclusive)");
        match self.docs.update(&Filter::eq("id", id), &mutation).await? {
            0 => Err(ServiceError::not_found("blog")),
            _ => Ok(()),
        }
    }
}
