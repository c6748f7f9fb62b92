//! Credential Store: signup and login over the `users` collection.

pub mod domain;
pub mod service;

pub use domain::AuthAction;
pub use service::CredentialStore;
