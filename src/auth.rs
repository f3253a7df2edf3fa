//! Google OAuth2 token storage and refresh.
//!
//! Token format is compatible with the file google-auth writes to
//! ~/.daybrief/google/token.json, so an existing authorization can be
//! reused directly. This module only loads and refreshes; it never runs
//! a consent flow. When the refresh token itself is dead
//! (`invalid_grant`) the caller gets `CredentialExpired` and must
//! re-authorize out of band.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::config_dir;
use crate::error::PlanningError;

/// OAuth2 token payload persisted at ~/.daybrief/google/token.json.
///
/// Field names match what google-auth's `Credentials.to_json()` produces.
/// Both `token` and `access_token` are accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleToken {
    /// The access token (google-auth writes this as "token").
    #[serde(alias = "access_token")]
    pub token: String,
    /// The refresh token, long-lived.
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Expiry time (ISO 8601).
    #[serde(default)]
    pub expiry: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Path to the persisted Google token.
pub fn token_path() -> Result<PathBuf, PlanningError> {
    Ok(config_dir()?.join("google").join("token.json"))
}

/// Load the token from disk. A missing file means the user never
/// authorized; surfaced as `CredentialExpired` because the remedy is the
/// same.
pub fn load_token() -> Result<GoogleToken, PlanningError> {
    let path = token_path()?;
    if !path.exists() {
        log::warn!("no Google token at {}", path.display());
        return Err(PlanningError::CredentialExpired);
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Persist a token, creating ~/.daybrief/google/ if needed.
pub fn save_token(token: &GoogleToken) -> Result<(), PlanningError> {
    let path = token_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(token)?)?;
    Ok(())
}

/// Check if a token is expired based on its expiry field. Unknown or
/// unparseable expiry is treated as expired: a refresh is cheap, a 401
/// mid-run is not.
pub fn is_token_expired(token: &GoogleToken) -> bool {
    match &token.expiry {
        None => true,
        Some(expiry_str) => {
            match chrono::DateTime::parse_from_rfc3339(&expiry_str.replace('Z', "+00:00"))
                .or_else(|_| chrono::DateTime::parse_from_rfc3339(expiry_str))
            {
                // Expired if within 60 seconds of expiry.
                Ok(expiry) => expiry <= chrono::Utc::now() + chrono::Duration::seconds(60),
                Err(_) => true,
            }
        }
    }
}

// Serializes concurrent refreshes so parallel fetchers don't race the
// token endpoint.
static TOKEN_REFRESH_MUTEX: std::sync::OnceLock<Mutex<()>> = std::sync::OnceLock::new();

fn refresh_mutex() -> &'static Mutex<()> {
    TOKEN_REFRESH_MUTEX.get_or_init(|| Mutex::new(()))
}

/// Refresh the access token using the refresh token and persist the
/// result. `invalid_grant` from Google means the refresh token is dead.
pub async fn refresh_access_token(token: &GoogleToken) -> Result<GoogleToken, PlanningError> {
    let _guard = refresh_mutex().lock().await;

    let refresh_token = token
        .refresh_token
        .as_ref()
        .ok_or(PlanningError::CredentialExpired)?;

    let mut form = vec![
        ("refresh_token", refresh_token.as_str()),
        ("client_id", token.client_id.as_str()),
        ("grant_type", "refresh_token"),
    ];
    if let Some(secret) = token.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }

    let client = reqwest::Client::new();
    let resp = client.post(&token.token_uri).form(&form).send().await?;
    let status = resp.status();
    let body_text = resp.text().await?;

    if !status.is_success() {
        if body_text.contains("invalid_grant") {
            log::warn!("Google refresh token revoked or expired");
            return Err(PlanningError::CredentialExpired);
        }
        return Err(PlanningError::ApiError {
            status: status.as_u16(),
            message: format!("token refresh failed: {}", body_text),
        });
    }

    let body: serde_json::Value = serde_json::from_str(&body_text)?;
    let access_token = body["access_token"].as_str().ok_or_else(|| {
        PlanningError::ApiError {
            status: status.as_u16(),
            message: "no access_token in refresh response".to_string(),
        }
    })?;
    let expires_in = body["expires_in"].as_u64().unwrap_or(3600);
    let expiry = chrono::Utc::now() + chrono::Duration::seconds(expires_in as i64);

    let mut new_token = token.clone();
    new_token.token = access_token.to_string();
    new_token.expiry = Some(expiry.to_rfc3339());
    save_token(&new_token)?;

    Ok(new_token)
}

/// Load the stored token, refreshing it first when expired.
pub async fn ensure_fresh_token() -> Result<GoogleToken, PlanningError> {
    let token = load_token()?;
    if is_token_expired(&token) {
        log::debug!("Google access token expired, refreshing");
        return refresh_access_token(&token).await;
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expiry: Option<&str>) -> GoogleToken {
        GoogleToken {
            token: "ya29.test".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: default_token_uri(),
            client_id: "client".to_string(),
            client_secret: None,
            scopes: vec![],
            expiry: expiry.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_missing_expiry_is_expired() {
        assert!(is_token_expired(&token(None)));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        assert!(is_token_expired(&token(Some("2020-01-01T00:00:00Z"))));
    }

    #[test]
    fn test_far_future_expiry_is_fresh() {
        assert!(!is_token_expired(&token(Some("2096-01-01T00:00:00Z"))));
    }

    #[test]
    fn test_unparseable_expiry_is_expired() {
        assert!(is_token_expired(&token(Some("someday"))));
    }

    #[test]
    fn test_accepts_access_token_alias() {
        let parsed: GoogleToken = serde_json::from_str(
            r#"{"access_token": "abc", "refresh_token": null, "client_id": "c"}"#,
        )
        .unwrap();
        assert_eq!(parsed.token, "abc");
        assert_eq!(parsed.token_uri, "https://oauth2.googleapis.com/token");
    }
}
