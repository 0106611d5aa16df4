//! Google OAuth code exchange.
//!
//! Only the server side of the authorization-code flow lives here: building
//! the consent URL, exchanging the callback code for an access token, and
//! fetching the user's profile.

use serde::Deserialize;

use crate::config::AuthConfig;
use crate::errors::AppError;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl GoogleOAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
        }
    }

    /// Consent URL the login route redirects to.
    pub fn authorize_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile",
            AUTH_URL, self.client_id, redirect_uri
        )
    }

    /// Exchange the callback code for an access token, then fetch the
    /// user's profile.
    pub async fn fetch_user_info(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleUserInfo, AppError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let res = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("token exchange failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::OAuth(format!(
                "token exchange rejected {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = res
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("token parse error: {}", e)))?;

        let res = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("userinfo fetch failed: {}", e)))?;

        if !res.status().is_success() {
            return Err(AppError::OAuth(format!(
                "userinfo fetch rejected: {}",
                res.status()
            )));
        }

        res.json()
            .await
            .map_err(|e| AppError::OAuth(format!("userinfo parse error: {}", e)))
    }
}
