use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::config::SheetsSettings;
use super::errors::CoreError;

const AUTH_TOKEN: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct GoogleTokenEnvelope {
    access_token: String,
    expires_at_utc: DateTime<Utc>,
}

impl GoogleTokenEnvelope {
    fn is_expiring_within(&self, duration: Duration) -> bool {
        let now = Utc::now();
        let threshold = now
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::minutes(5));
        self.expires_at_utc <= threshold
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Service-account credentials exchanged for short-lived Sheets access tokens.
pub struct ServiceAccountAuth {
    client: Client,
    client_email: Option<String>,
    private_key: Option<String>,
    cached: Mutex<Option<GoogleTokenEnvelope>>,
}

impl ServiceAccountAuth {
    pub fn new(client: Client, settings: &SheetsSettings) -> Self {
        Self {
            client,
            client_email: settings.client_email.clone(),
            private_key: settings.private_key.clone(),
            cached: Mutex::new(None),
        }
    }

    pub async fn get_access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expiring_within(Duration::from_secs(5 * 60)) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> anyhow::Result<GoogleTokenEnvelope> {
        let client_email = self
            .client_email
            .as_deref()
            .ok_or(CoreError::MissingConfig("GOOGLE_SHEETS_CLIENT_EMAIL"))?;
        let private_key = self
            .private_key
            .as_deref()
            .ok_or(CoreError::MissingConfig("GOOGLE_SHEETS_PRIVATE_KEY"))?;

        let assertion = sign_assertion(client_email, private_key, Utc::now())?;
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self.client.post(AUTH_TOKEN).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(CoreError::GoogleApi {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let payload = serde_json::from_str::<TokenResponse>(&body)
            .context("failed to parse Google token response")?;
        debug!(expires_in = payload.expires_in, "obtained Google access token");

        Ok(GoogleTokenEnvelope {
            access_token: payload.access_token,
            expires_at_utc: Utc::now() + chrono::Duration::seconds(payload.expires_in),
        })
    }
}

fn assertion_claims(client_email: &str, issued_at: DateTime<Utc>) -> AssertionClaims<'_> {
    let iat = issued_at.timestamp();
    AssertionClaims {
        iss: client_email,
        scope: SHEETS_SCOPE,
        aud: AUTH_TOKEN,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    }
}

fn sign_assertion(
    client_email: &str,
    private_key: &str,
    issued_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .context("GOOGLE_SHEETS_PRIVATE_KEY is not a valid RSA PEM key")?;
    let claims = assertion_claims(client_email, issued_at);
    let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?;
    Ok(token)
}
