use std::time::Instant;

use crate::audio::domain::audio_probe::AudioProbe;
use crate::pipeline::error::{DestinationError, SourceError, TranscribeError};
use crate::pipeline::job_logger::JobLogger;
use crate::pipeline::operation_poller::{OperationOutcome, OperationPoller};
use crate::pipeline::recognition_profile::RecognitionProfile;
use crate::shared::object_name::default_object_name;
use crate::speech::domain::operation::OperationHandle;
use crate::speech::domain::recognition_config::RecognitionRequest;
use crate::speech::domain::transcription_service::TranscriptionService;
use crate::storage::domain::object_store::ObjectStore;
use crate::storage::domain::storage_locator::StorageLocator;

/// What a successful job produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobReport {
    pub destination: StorageLocator,
    pub operation: OperationHandle,
    pub detected_sample_rate: Option<u32>,
    pub transcript_chars: usize,
}

/// Transcribes one storage object into a text object.
///
/// Steps:
/// 1. Resolve the destination (default object name if omitted) and check its bucket
/// 2. Probed profile only: validate the source, download it to a temp file, read its sample rate
/// 3. Submit the recognition request and wait for the operation to finish
/// 4. Upload the joined transcript, or return the operation's error
pub struct TranscribeJobUseCase {
    store: Box<dyn ObjectStore>,
    service: Box<dyn TranscriptionService>,
    probe: Option<Box<dyn AudioProbe>>,
    profile: RecognitionProfile,
    poller: OperationPoller,
    logger: Box<dyn JobLogger>,
}

impl TranscribeJobUseCase {
    pub fn new(
        store: Box<dyn ObjectStore>,
        service: Box<dyn TranscriptionService>,
        probe: Option<Box<dyn AudioProbe>>,
        profile: RecognitionProfile,
        poller: OperationPoller,
        logger: Box<dyn JobLogger>,
    ) -> Self {
        Self {
            store,
            service,
            probe,
            profile,
            poller,
            logger,
        }
    }

    pub fn logger(&self) -> &dyn JobLogger {
        self.logger.as_ref()
    }

    pub fn execute(
        &mut self,
        source_uri: &str,
        destination_uri: &str,
    ) -> Result<JobReport, TranscribeError> {
        let destination = self.resolve_destination(destination_uri)?;

        let detected_sample_rate = match &self.profile {
            RecognitionProfile::Probed {
                required_extension, ..
            } => {
                let source = validate_source(source_uri, required_extension)?;
                Some(self.detect_sample_rate(source_uri, &source)?)
            }
            RecognitionProfile::Fixed { .. } => None,
        };

        let request = RecognitionRequest {
            config: self.profile.config(detected_sample_rate),
            audio_uri: source_uri.to_string(),
        };

        let started = Instant::now();
        let operation = self
            .service
            .submit(&request)
            .map_err(TranscribeError::Speech)?;
        self.logger.timing("submit", elapsed_ms(started));
        self.logger
            .info(&format!("Submitted {source_uri} as operation {operation}"));

        let started = Instant::now();
        let outcome = self
            .poller
            .wait(self.service.as_ref(), &operation, self.logger.as_mut())
            .map_err(TranscribeError::Speech)?;
        self.logger.timing("wait", elapsed_ms(started));

        let result = match outcome {
            OperationOutcome::Succeeded(result) => result,
            OperationOutcome::Failed(error) => {
                return Err(TranscribeError::RemoteOperation {
                    operation: operation.name,
                    source: error,
                });
            }
        };

        let text = result.full_text();
        let key = destination.key.as_deref().unwrap_or_default();

        let started = Instant::now();
        self.store
            .upload(&destination.bucket, key, &text)
            .map_err(TranscribeError::Storage)?;
        self.logger.timing("upload", elapsed_ms(started));
        self.logger.info(&format!(
            "Wrote {} segments ({} chars) to {destination}",
            result.segments.len(),
            text.chars().count()
        ));

        Ok(JobReport {
            destination,
            operation,
            detected_sample_rate,
            transcript_chars: text.chars().count(),
        })
    }

    /// Parse the destination, fill in a default key, and check the bucket exists.
    fn resolve_destination(&self, uri: &str) -> Result<StorageLocator, TranscribeError> {
        let parsed =
            StorageLocator::parse(uri).map_err(|e| TranscribeError::invalid_destination(uri, e))?;
        let destination = match parsed.key {
            Some(_) => parsed,
            None => {
                let named = parsed.with_key(default_object_name());
                log::info!("No destination object given, using {named}");
                named
            }
        };

        let exists = self
            .store
            .bucket_exists(&destination.bucket)
            .map_err(TranscribeError::Storage)?;
        if !exists {
            return Err(TranscribeError::invalid_destination(
                uri,
                DestinationError::BucketNotFound(destination.bucket.clone()),
            ));
        }
        Ok(destination)
    }

    /// Download the source to a scoped temp file and read its sample rate.
    ///
    /// The temp file is removed when this returns, on success or error.
    fn detect_sample_rate(
        &mut self,
        uri: &str,
        source: &StorageLocator,
    ) -> Result<u32, TranscribeError> {
        let probe = self.probe.as_ref().ok_or_else(|| {
            TranscribeError::Config("probed profile requires an audio probe".to_string())
        })?;
        let key = source.key.as_deref().unwrap_or_default();

        let exists = self
            .store
            .object_exists(&source.bucket, key)
            .map_err(TranscribeError::Storage)?;
        if !exists {
            return Err(TranscribeError::invalid_source(uri, SourceError::ObjectNotFound));
        }

        let started = Instant::now();
        let suffix = source
            .extension()
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let temp = tempfile::Builder::new()
            .prefix("gcs-transcribe-")
            .suffix(&suffix)
            .tempfile()
            .map_err(TranscribeError::TempFile)?;

        self.store
            .download_to_file(&source.bucket, key, temp.path())
            .map_err(TranscribeError::Storage)?;
        let properties = probe.probe(temp.path()).map_err(TranscribeError::Probe)?;
        temp.close().map_err(TranscribeError::TempFile)?;

        self.logger.timing("probe", elapsed_ms(started));
        self.logger.info(&format!(
            "Detected sample rate {} Hz in {uri}",
            properties.sample_rate
        ));
        Ok(properties.sample_rate)
    }
}

/// Check a source locator for the probed profile before anything is downloaded.
pub fn validate_source(uri: &str, required_extension: &str) -> Result<StorageLocator, TranscribeError> {
    let source = StorageLocator::parse(uri)
        .map_err(|e| TranscribeError::invalid_source(uri, SourceError::from(e)))?;
    if source.key.is_none() {
        return Err(TranscribeError::invalid_source(uri, SourceError::MissingObject));
    }
    match source.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(required_extension) => Ok(source),
        found => Err(TranscribeError::invalid_source(
            uri,
            SourceError::UnsupportedExtension {
                expected: required_extension.to_string(),
                found: found.map(str::to_string),
            },
        )),
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
