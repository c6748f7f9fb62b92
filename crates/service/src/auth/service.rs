use std::sync::Arc;

use models::User;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::errors::ServiceError;
use crate::metrics;
use crate::storage::{DocumentCollection, Filter};

/// Signup and login over the `users` collection.
///
/// The collection offers no check-and-insert primitive, so signup holds this
/// store's guard exclusively across the existence check and the insert. Logins
/// share it. Passwords are stored and compared verbatim.
pub struct CredentialStore {
    users: Arc<dyn DocumentCollection<User>>,
    guard: RwLock<()>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn DocumentCollection<User>>) -> Self {
        Self { users, guard: RwLock::new(()) }
    }

    /// Register a new user.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::User;
    /// use service::auth::CredentialStore;
    /// use service::errors::ServiceError;
    /// use service::storage::MemoryCollection;
    ///
    /// let store = CredentialStore::new(Arc::new(MemoryCollection::<User>::new()));
    /// tokio_test::block_on(store.signup(User::new("a", "p1"))).unwrap();
    /// let again = tokio_test::block_on(store.signup(User::new("a", "other")));
    /// assert!(matches!(again, Err(ServiceError::Conflict(_))));
    /// ```
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn signup(&self, user: User) -> Result<(), ServiceError> {
        let res = self.signup_locked(user).await;
        metrics::record("signup", &res);
        res
    }

    async fn signup_locked(&self, user: User) -> Result<(), ServiceError> {
        let _guard = self.guard.write().await;
        if self.users.find_one(&Filter::eq("username", user.username.as_str())).await?.is_some() {
            debug!("username already taken");
            return Err(ServiceError::Conflict(format!("username {} is already taken", user.username)));
        }
        let username = user.username.clone();
        self.users.insert(user).await?;
        info!(%username, "user_registered");
        Ok(())
    }

    /// Succeeds iff a user with exactly this username and password exists.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::User;
    /// use service::auth::CredentialStore;
    /// use service::storage::MemoryCollection;
    ///
    /// let store = CredentialStore::new(Arc::new(MemoryCollection::<User>::new()));
    /// tokio_test::block_on(store.signup(User::new("a", "p1"))).unwrap();
    /// assert!(tokio_test::block_on(store.login(User::new("a", "p1"))).is_ok());
    /// assert!(tokio_test::block_on(store.login(User::new("a", "wrong"))).is_err());
    /// ```
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn login(&self, user: User) -> Result<(), ServiceError> {
        let res = self.login_shared(&user).await;
        metrics::record("login", &res);
        res
    }

    async fn login_shared(&self, user: &User) -> Result<(), ServiceError> {
        let _guard = self.guard.read().await;
        let filter = Filter::eq("username", user.username.as_str()).and("password", user.password.as_str());
        match self.users.find_one(&filter).await? {
            Some(_) => Ok(()),
            None => {
                warn!("login rejected");
                Err(ServiceError::Unauthorized)
            }
        }
    }
}
