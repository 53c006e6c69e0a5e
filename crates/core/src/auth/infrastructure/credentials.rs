use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::auth::domain::token_provider::TokenProvider;
use crate::auth::infrastructure::service_account_token_provider::{
    AuthError, ServiceAccountTokenProvider,
};
use crate::auth::infrastructure::static_token_provider::StaticTokenProvider;

pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
pub const APPLICATION_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error(
        "no Google credentials found: pass --credentials, set GOOGLE_APPLICATION_CREDENTIALS, \
         or set GOOGLE_OAUTH_ACCESS_TOKEN"
    )]
    NotFound,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Where the access token will come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    ServiceAccountKey(PathBuf),
    AccessToken(String),
}

impl CredentialSource {
    /// Pick a credential source.
    ///
    /// Resolution order:
    /// 1. Explicit key file (CLI flag or settings)
    /// 2. `GOOGLE_OAUTH_ACCESS_TOKEN`
    /// 3. `GOOGLE_APPLICATION_CREDENTIALS`
    pub fn resolve(
        explicit_key: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CredentialsError> {
        if let Some(path) = explicit_key {
            return Ok(Self::ServiceAccountKey(path.to_path_buf()));
        }
        if let Some(token) = env(ACCESS_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            return Ok(Self::AccessToken(token.trim().to_string()));
        }
        if let Some(path) = env(APPLICATION_CREDENTIALS_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::ServiceAccountKey(PathBuf::from(path)));
        }
        Err(CredentialsError::NotFound)
    }

    pub fn into_provider(self) -> Result<Box<dyn TokenProvider>, CredentialsError> {
        match self {
            Self::AccessToken(token) => {
                log::info!("Using access token from {ACCESS_TOKEN_ENV}");
                Ok(Box::new(StaticTokenProvider::new(token)))
            }
            Self::ServiceAccountKey(path) => {
                let provider = ServiceAccountTokenProvider::from_file(&path)?;
                log::info!(
                    "Using service account {} from {}",
                    provider.client_email(),
                    path.display()
                );
                Ok(Box::new(provider))
            }
        }
    }
}
