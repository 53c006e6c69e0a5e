use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::domain::token_provider::TokenProvider;
use crate::shared::constants::DEFAULT_SPEECH_BASE_URL;
use crate::speech::domain::operation::{OperationError, OperationHandle, OperationStatus};
use crate::speech::domain::recognition_config::{RecognitionConfig, RecognitionRequest};
use crate::speech::domain::transcript::{SegmentResult, SpeechAlternative, TranscriptResult};
use crate::speech::domain::transcription_service::TranscriptionService;
use crate::BoxError;

#[derive(Error, Debug)]
pub enum SpeechApiError {
    #[error("invalid speech base URL '{url}'")]
    BaseUrl { url: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
}

#[derive(Serialize)]
struct LongRunningRecognizeBody<'a> {
    config: &'a RecognitionConfig,
    audio: AudioSource<'a>,
}

#[derive(Serialize)]
struct AudioSource<'a> {
    uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct OperationDto {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    metadata: Option<MetadataDto>,
    #[serde(default)]
    response: Option<ResponseDto>,
    #[serde(default)]
    error: Option<StatusDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataDto {
    #[serde(default)]
    progress_percent: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ResponseDto {
    #[serde(default)]
    results: Vec<ResultDto>,
}

#[derive(Debug, Deserialize)]
struct ResultDto {
    #[serde(default)]
    alternatives: Vec<AlternativeDto>,
}

#[derive(Debug, Deserialize)]
struct AlternativeDto {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f32,
}

#[derive(Debug, Deserialize)]
struct StatusDto {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl OperationDto {
    /// An `error` always means failure, even if `done` is missing.
    fn into_status(self) -> OperationStatus {
        if let Some(error) = self.error {
            return OperationStatus::Failed(OperationError {
                code: error.code,
                message: error.message,
            });
        }
        if !self.done {
            return OperationStatus::Running {
                progress_percent: self.metadata.and_then(|m| m.progress_percent),
            };
        }
        let segments = self
            .response
            .map(|r| r.results)
            .unwrap_or_default()
            .into_iter()
            .map(|result| SegmentResult {
                alternatives: result
                    .alternatives
                    .into_iter()
                    .map(|alt| SpeechAlternative {
                        transcript: alt.transcript,
                        confidence: alt.confidence,
                    })
                    .collect(),
            })
            .collect();
        OperationStatus::Succeeded(TranscriptResult { segments })
    }
}

/// Speech-to-Text v1 REST client for long-running recognition.
pub struct GoogleSpeechClient {
    base_url: Url,
    http: Client,
    tokens: Box<dyn TokenProvider>,
}

impl GoogleSpeechClient {
    pub fn new(tokens: Box<dyn TokenProvider>) -> Result<Self, SpeechApiError> {
        Self::with_base_url(DEFAULT_SPEECH_BASE_URL, tokens)
    }

    pub fn with_base_url(
        base_url: &str,
        tokens: Box<dyn TokenProvider>,
    ) -> Result<Self, SpeechApiError> {
        let parsed = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| SpeechApiError::BaseUrl {
                url: base_url.to_string(),
            })?;
        Ok(Self {
            base_url: parsed,
            http: Client::new(),
            tokens,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn recognize_url(&self) -> Url {
        self.endpoint(&["v1", "speech:longrunningrecognize"])
    }

    fn operation_url(&self, name: &str) -> Url {
        self.endpoint(&["v1", "operations", name])
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, BoxError> {
        let token = self.tokens.access_token()?;
        log::debug!("{method} {url}");

        let request_err = |e| SpeechApiError::Request {
            url: url.to_string(),
            source: e,
        };
        let response = request.bearer_auth(token).send().map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechApiError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            }
            .into());
        }
        Ok(response.json::<T>().map_err(request_err)?)
    }
}

impl TranscriptionService for GoogleSpeechClient {
    fn submit(&self, request: &RecognitionRequest) -> Result<OperationHandle, BoxError> {
        let url = self.recognize_url();
        let body = LongRunningRecognizeBody {
            config: &request.config,
            audio: AudioSource {
                uri: &request.audio_uri,
            },
        };
        let operation: OperationDto =
            self.call("POST", self.http.post(url.clone()).json(&body), &url)?;
        Ok(OperationHandle::new(operation.name))
    }

    fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, BoxError> {
        let url = self.operation_url(&handle.name);
        let operation: OperationDto = self.call("GET", self.http.get(url.clone()), &url)?;
        Ok(operation.into_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::infrastructure::static_token_provider::StaticTokenProvider;
    use crate::shared::mock_api::{header, target, MockApi};
    use crate::speech::domain::recognition_config::AudioEncoding;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn client(base: &str) -> GoogleSpeechClient {
        let mut client =
            GoogleSpeechClient::with_base_url(base, Box::new(StaticTokenProvider::new("tok")))
                .unwrap();
        client.http = Client::builder().no_proxy().build().unwrap();
        client
    }

    fn parse(json: &str) -> OperationStatus {
        serde_json::from_str::<OperationDto>(json)
            .unwrap()
            .into_status()
    }

    fn request() -> RecognitionRequest {
        RecognitionRequest {
            config: RecognitionConfig {
                encoding: Some(AudioEncoding::Linear16),
                sample_rate_hertz: Some(32000),
                language_code: "ca-ES".to_string(),
                enable_automatic_punctuation: true,
            },
            audio_uri: "gs://src/audio.raw".to_string(),
        }
    }

    #[test]
    fn test_running_operation_with_progress() {
        let status = parse(
            r#"{"name":"42","metadata":{"@type":"type.googleapis.com/google.cloud.speech.v1.LongRunningRecognizeMetadata","progressPercent":35}}"#,
        );
        assert_eq!(
            status,
            OperationStatus::Running {
                progress_percent: Some(35)
            }
        );
    }

    #[test]
    fn test_running_operation_without_metadata() {
        assert_eq!(
            parse(r#"{"name":"42"}"#),
            OperationStatus::Running {
                progress_percent: None
            }
        );
    }

    #[test]
    fn test_succeeded_operation_maps_segments() {
        let status = parse(
            r#"{
                "name": "42",
                "done": true,
                "response": {
                    "results": [
                        {"alternatives": [{"transcript": "bon", "confidence": 0.91}, {"transcript": "bo"}]},
                        {"alternatives": [{"transcript": "dia", "confidence": 0.88}], "languageCode": "ca-es"}
                    ]
                }
            }"#,
        );
        let result = match status {
            OperationStatus::Succeeded(result) => result,
            other => panic!("expected success, got {other:?}"),
        };
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].alternatives.len(), 2);
        assert_eq!(result.full_text(), "bon dia");
    }

    #[test]
    fn test_done_without_results_is_empty_success() {
        assert_eq!(
            parse(r#"{"name":"42","done":true,"response":{}}"#),
            OperationStatus::Succeeded(TranscriptResult::default())
        );
    }

    #[test]
    fn test_failed_operation_keeps_payload() {
        let status = parse(
            r#"{"name":"42","done":true,"error":{"code":3,"message":"Invalid recognition 'config': bad encoding."}}"#,
        );
        assert_eq!(
            status,
            OperationStatus::Failed(OperationError {
                code: 3,
                message: "Invalid recognition 'config': bad encoding.".to_string(),
            })
        );
    }

    #[test]
    fn test_operation_url_escapes_name() {
        let client = client("https://speech.googleapis.com");
        assert_eq!(
            client.operation_url("123/456").as_str(),
            "https://speech.googleapis.com/v1/operations/123%2F456"
        );
        assert_eq!(
            client.recognize_url().as_str(),
            "https://speech.googleapis.com/v1/speech:longrunningrecognize"
        );
    }

    #[test]
    fn test_submit_posts_config_and_audio() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/v1/speech:longrunningrecognize"))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"7781"}"#)),
        );

        let handle = client(&api.uri()).submit(&request()).unwrap();
        assert_eq!(handle, OperationHandle::new("7781"));

        let requests = api.requests();
        assert_eq!(requests[0].method.as_str(), "POST");
        assert_eq!(target(&requests[0]), "/v1/speech:longrunningrecognize");
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer tok"));
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "config": {
                    "encoding": "LINEAR16",
                    "sampleRateHertz": 32000,
                    "languageCode": "ca-ES",
                    "enableAutomaticPunctuation": true
                },
                "audio": {"uri": "gs://src/audio.raw"}
            })
        );
    }

    #[test]
    fn test_poll_gets_operation() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("GET"))
                .and(path("/v1/operations/7781"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(r#"{"name":"7781","done":false}"#),
                ),
        );

        let status = client(&api.uri()).poll(&OperationHandle::new("7781")).unwrap();
        assert!(!status.is_done());

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method.as_str(), "GET");
        assert_eq!(target(&requests[0]), "/v1/operations/7781");
    }

    #[test]
    fn test_http_error_is_surfaced() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST")).respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"error":{"code":401,"message":"Request had invalid authentication credentials."}}"#,
            )),
        );

        let err = client(&api.uri()).submit(&request()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("401"), "{message}");
        assert!(message.contains("invalid authentication"), "{message}");
    }
}
