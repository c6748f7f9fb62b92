use serde::Deserialize;

/// What a `POST /api/users` request asks for. Login unless signup is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthAction {
    #[default]
    Login,
    Signup,
}
