//! Blog Store: owns the `blogs` collection, assigns blog ids and applies
//! likes, comments and deletions under one collection-wide guard.

pub mod store;

pub use store::BlogStore;
