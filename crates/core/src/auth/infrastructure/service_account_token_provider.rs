use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::domain::token_provider::TokenProvider;
use crate::shared::constants::{
    CLOUD_PLATFORM_SCOPE, DEFAULT_TOKEN_URI, SERVICE_ACCOUNT_TOKEN_LIFETIME_SECS,
    TOKEN_EXPIRY_MARGIN_SECS,
};
use crate::BoxError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("failed to read credentials from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid service account key in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to sign token assertion: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("token request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("token endpoint {url} returned {status}: {body}")]
    Rejected {
        url: String,
        status: u16,
        body: String,
    },
}

/// The fields of a Google service account JSON key that the token flow needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let json = fs::read_to_string(path).map_err(|e| AuthError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| AuthError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// OAuth2 JWT-bearer flow for service accounts.
///
/// Signs an RS256 assertion with the key's private key, exchanges it at the
/// key's `token_uri`, and reuses the token until shortly before it expires.
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    http: reqwest::blocking::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            http: reqwest::blocking::Client::new(),
            cache: Mutex::new(None),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let key = ServiceAccountKey::from_file(path)?;
        log::debug!("Loaded service account {}", key.client_email);
        Ok(Self::new(key))
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn assertion(&self, issued_at: u64) -> Result<String, AuthError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + SERVICE_ACCOUNT_TOKEN_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let signing_key =
            EncodingKey::from_rsa_pem(self.key.private_key.as_bytes()).map_err(AuthError::Sign)?;
        jsonwebtoken::encode(&header, &claims, &signing_key).map_err(AuthError::Sign)
    }

    fn fetch(&self) -> Result<CachedToken, AuthError> {
        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let assertion = self.assertion(issued_at)?;
        let url = self.key.token_uri.as_str();

        let response = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .map_err(|e| AuthError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                url: url.to_string(),
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().map_err(|e| AuthError::Request {
            url: url.to_string(),
            source: e,
        })?;
        let lifetime = token
            .expires_in
            .unwrap_or(SERVICE_ACCOUNT_TOKEN_LIFETIME_SECS);
        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Instant::now() + refresh_after(lifetime),
        })
    }
}

fn refresh_after(lifetime_secs: u64) -> Duration {
    Duration::from_secs(lifetime_secs.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS))
}

impl TokenProvider for ServiceAccountTokenProvider {
    fn access_token(&self) -> Result<String, BoxError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| "service account token cache lock poisoned")?;

        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.value.clone());
            }
        }

        log::debug!("Requesting access token for {}", self.key.client_email);
        let fresh = self.fetch()?;
        let value = fresh.value.clone();
        *cache = Some(fresh);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::mock_api::MockApi;
    use jsonwebtoken::{DecodingKey, Validation};
    use tempfile::NamedTempFile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    const PRIVATE_KEY: &str = include_str!("../../../testdata/test_service_account_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../../testdata/test_service_account_pub.pem");

    fn test_key() -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "transcriber@project.iam.gserviceaccount.com".to_string(),
            private_key: PRIVATE_KEY.to_string(),
            private_key_id: Some("key-1".to_string()),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_assertion_is_signed_with_expected_claims() {
        let provider = ServiceAccountTokenProvider::new(test_key());
        let jwt = provider.assertion(now()).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[DEFAULT_TOKEN_URI]);
        let decoded = jsonwebtoken::decode::<AssertionClaims>(
            &jwt,
            &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.header.kid.as_deref(), Some("key-1"));
        assert_eq!(decoded.claims.iss, "transcriber@project.iam.gserviceaccount.com");
        assert_eq!(decoded.claims.scope, CLOUD_PLATFORM_SCOPE);
        assert_eq!(
            decoded.claims.exp - decoded.claims.iat,
            SERVICE_ACCOUNT_TOKEN_LIFETIME_SECS
        );
    }

    #[test]
    fn test_assertion_with_invalid_key_fails() {
        let mut key = test_key();
        key.private_key = "not a pem".to_string();
        let provider = ServiceAccountTokenProvider::new(key);
        assert!(matches!(provider.assertion(now()), Err(AuthError::Sign(_))));
    }

    #[test]
    fn test_key_from_file_defaults_token_uri() {
        let file = NamedTempFile::new().unwrap();
        let json = serde_json::json!({
            "type": "service_account",
            "client_email": "a@b.iam.gserviceaccount.com",
            "private_key": PRIVATE_KEY,
        });
        fs::write(file.path(), json.to_string()).unwrap();

        let key = ServiceAccountKey::from_file(file.path()).unwrap();
        assert_eq!(key.client_email, "a@b.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(key.private_key_id.is_none());
    }

    #[test]
    fn test_key_from_missing_file() {
        let result = ServiceAccountKey::from_file(Path::new("/nonexistent/key.json"));
        assert!(matches!(result, Err(AuthError::Read { .. })));
    }

    #[test]
    fn test_key_from_malformed_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "{\"client_email\": 42}").unwrap();
        let err = ServiceAccountKey::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AuthError::Parse { .. }));
        assert!(err.to_string().contains("invalid service account key"));
    }

    #[test]
    fn test_refresh_after_subtracts_margin() {
        assert_eq!(refresh_after(3600), Duration::from_secs(3540));
        assert_eq!(refresh_after(30), Duration::ZERO);
    }

    #[test]
    fn test_cached_token_is_reused() {
        let provider = ServiceAccountTokenProvider::new(test_key());
        *provider.cache.lock().unwrap() = Some(CachedToken {
            value: "cached".to_string(),
            refresh_at: Instant::now() + Duration::from_secs(600),
        });
        assert_eq!(provider.access_token().unwrap(), "cached");
    }

    #[test]
    fn test_key_debug_redacts_private_key() {
        let debug = format!("{:?}", test_key());
        assert!(debug.contains("transcriber@project.iam.gserviceaccount.com"));
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("PRIVATE KEY"));
    }

    fn provider_against(api: &MockApi) -> ServiceAccountTokenProvider {
        let mut key = test_key();
        key.token_uri = format!("{}/token", api.uri());
        let mut provider = ServiceAccountTokenProvider::new(key);
        provider.http = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap();
        provider
    }

    #[test]
    fn test_token_exchange_posts_assertion_and_caches() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/token"))
                .respond_with(ResponseTemplate::new(200).set_body_string(
                    r#"{"access_token":"ya29.fresh","expires_in":3599,"token_type":"Bearer"}"#,
                )),
        );
        let provider = provider_against(&api);

        assert_eq!(provider.access_token().unwrap(), "ya29.fresh");
        assert_eq!(provider.access_token().unwrap(), "ya29.fresh");

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(
            body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"),
            "{body}"
        );
        assert!(body.contains("&assertion="), "{body}");
    }

    #[test]
    fn test_token_exchange_rejection_is_error() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST")).respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            ),
        );

        let err = provider_against(&api).fetch().err().unwrap();
        assert!(matches!(err, AuthError::Rejected { status: 400, .. }));
        assert!(err.to_string().contains("invalid_grant"));
    }
}
