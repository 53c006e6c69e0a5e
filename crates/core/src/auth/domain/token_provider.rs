use std::sync::Arc;

use crate::BoxError;

/// Domain interface for obtaining OAuth2 bearer tokens for Google APIs.
///
/// Implementations may cache tokens; callers ask for a token before every
/// request and must not hold on to it.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Result<String, BoxError>;
}

/// Lets several clients share one provider and its token cache.
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    fn access_token(&self) -> Result<String, BoxError> {
        (**self).access_token()
    }
}
