//! Records owned by the blog repository, in the JSON shape they take both on the
//! wire and inside the document store.

pub mod blog;
pub mod user;

pub use blog::{Blog, BlogDraft, BlogId, Comment};
pub use user::User;
