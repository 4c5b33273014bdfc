use crate::{HttpClient, Result};
use backoffice_types::{Credentials, Envelope, LoginResponse, TokenResponse};
use serde_json::Value;

/// Login, logout and token refresh.
///
/// Tokens are returned to the caller; storing them in a session is left to
/// whoever drives the login.
#[derive(Clone)]
pub struct AuthApi {
    http: HttpClient,
}

impl AuthApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Envelope<LoginResponse>> {
        self.http.post("/auth/login", Some(credentials)).await
    }

    pub async fn logout(&self) -> Result<Envelope<Value>> {
        self.http.post_empty("/auth/logout").await
    }

    pub async fn refresh_token(&self) -> Result<Envelope<TokenResponse>> {
        self.http.post_empty("/auth/refresh").await
    }
}
