use crate::auth::domain::token_provider::TokenProvider;
use crate::BoxError;

/// Hands out a pre-issued access token, e.g. from `gcloud auth print-access-token`.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TokenProvider for StaticTokenProvider {
    fn access_token(&self) -> Result<String, BoxError> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_token() {
        let provider = StaticTokenProvider::new("ya29.abc");
        assert_eq!(provider.access_token().unwrap(), "ya29.abc");
    }

    #[test]
    fn test_debug_redacts_token() {
        let provider = StaticTokenProvider::new("ya29.secret");
        let debug = format!("{provider:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }
}
