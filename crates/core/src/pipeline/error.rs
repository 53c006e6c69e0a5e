use thiserror::Error;

use crate::speech::domain::operation::OperationError;
use crate::storage::domain::storage_locator::LocatorError;
use crate::BoxError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    #[error(transparent)]
    Locator(#[from] LocatorError),
    #[error("bucket '{0}' does not exist")]
    BucketNotFound(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("expected a gs:// URI")]
    WrongScheme,
    #[error("missing bucket name")]
    MissingBucket,
    #[error("missing object name")]
    MissingObject,
    #[error("expected a .{expected} file, got {}", describe_extension(.found))]
    UnsupportedExtension {
        expected: String,
        found: Option<String>,
    },
    #[error("object does not exist")]
    ObjectNotFound,
}

fn describe_extension(found: &Option<String>) -> String {
    match found {
        Some(ext) => format!(".{ext}"),
        None => "no extension".to_string(),
    }
}

impl From<LocatorError> for SourceError {
    fn from(err: LocatorError) -> Self {
        match err {
            LocatorError::WrongScheme => SourceError::WrongScheme,
            LocatorError::MissingBucket => SourceError::MissingBucket,
        }
    }
}

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("{0}")]
    Usage(String),
    #[error("invalid destination URI '{uri}': {reason}")]
    InvalidDestination { uri: String, reason: DestinationError },
    #[error("invalid source URI '{uri}': {reason}")]
    InvalidSource { uri: String, reason: SourceError },
    #[error("transcription operation {operation} failed with {source}")]
    RemoteOperation {
        operation: String,
        #[source]
        source: OperationError,
    },
    #[error("storage request failed: {0}")]
    Storage(#[source] BoxError),
    #[error("speech request failed: {0}")]
    Speech(#[source] BoxError),
    #[error("audio probe failed: {0}")]
    Probe(#[source] BoxError),
    #[error("temporary file error: {0}")]
    TempFile(#[source] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl TranscribeError {
    pub fn invalid_destination(uri: &str, reason: impl Into<DestinationError>) -> Self {
        Self::InvalidDestination {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_source(uri: &str, reason: impl Into<SourceError>) -> Self {
        Self::InvalidSource {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_message_includes_uri_and_reason() {
        let err = TranscribeError::invalid_destination("http://dst", LocatorError::WrongScheme);
        assert_eq!(
            err.to_string(),
            "invalid destination URI 'http://dst': expected a gs:// URI"
        );
    }

    #[test]
    fn test_unsupported_extension_message() {
        let with_ext = SourceError::UnsupportedExtension {
            expected: "mp3".to_string(),
            found: Some("wav".to_string()),
        };
        assert_eq!(with_ext.to_string(), "expected a .mp3 file, got .wav");

        let without_ext = SourceError::UnsupportedExtension {
            expected: "mp3".to_string(),
            found: None,
        };
        assert_eq!(without_ext.to_string(), "expected a .mp3 file, got no extension");
    }

    #[test]
    fn test_locator_error_maps_to_source_error() {
        assert_eq!(SourceError::from(LocatorError::MissingBucket), SourceError::MissingBucket);
        assert_eq!(SourceError::from(LocatorError::WrongScheme), SourceError::WrongScheme);
    }

    #[test]
    fn test_remote_operation_keeps_payload() {
        let err = TranscribeError::RemoteOperation {
            operation: "42".to_string(),
            source: OperationError {
                code: 3,
                message: "bad audio".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "transcription operation 42 failed with code 3: bad audio"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
