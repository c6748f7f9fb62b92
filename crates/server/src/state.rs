use std::sync::Arc;

use service::{auth::CredentialStore, blog::BlogStore, runtime::Stores};

/// Shared handler state: one store per collection.
#[derive(Clone)]
pub struct AppState {
    pub blogs: Arc<BlogStore>,
    pub users: Arc<CredentialStore>,
}

impl From<Stores> for AppState {
    fn from(stores: Stores) -> Self {
        Self { blogs: stores.blogs, users: stores.users }
    }
}

impl AppState {
    pub fn in_memory() -> Self {
        Stores::in_memory().into()
    }
}
