use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
};
use models::User;
use serde::Deserialize;
use service::auth::AuthAction;

use crate::errors::{decode, ApiError};
use crate::routes::to_completion;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    #[serde(default)]
    pub action: AuthAction,
}

/// `POST /api/users`: login (200) by default, signup (201) with `?action=signup`.
pub async fn signup_or_login(
    State(state): State<AppState>,
    query: Result<Query<UsersQuery>, QueryRejection>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let Query(query) = query?;
    let user: User = decode(&body)?;
    match query.action {
        AuthAction::Login => {
            state.users.login(user).await?;
            Ok(StatusCode::OK)
        }
        AuthAction::Signup => {
            to_completion(async move { state.users.signup(user).await }).await?;
            Ok(StatusCode::CREATED)
        }
    }
}
