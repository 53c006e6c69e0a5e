use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Codec identifiers accepted by the recognition service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    Linear16,
    Flac,
    Mulaw,
    Amr,
    AmrWb,
    OggOpus,
    SpeexWithHeaderByte,
    Mp3,
    WebmOpus,
}

impl AudioEncoding {
    pub const ALL: &[AudioEncoding] = &[
        AudioEncoding::Linear16,
        AudioEncoding::Flac,
        AudioEncoding::Mulaw,
        AudioEncoding::Amr,
        AudioEncoding::AmrWb,
        AudioEncoding::OggOpus,
        AudioEncoding::SpeexWithHeaderByte,
        AudioEncoding::Mp3,
        AudioEncoding::WebmOpus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Flac => "FLAC",
            AudioEncoding::Mulaw => "MULAW",
            AudioEncoding::Amr => "AMR",
            AudioEncoding::AmrWb => "AMR_WB",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::SpeexWithHeaderByte => "SPEEX_WITH_HEADER_BYTE",
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::WebmOpus => "WEBM_OPUS",
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|e| e.as_str().to_lowercase()).collect();
                format!("unknown encoding '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Recognition parameters sent alongside the audio reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    /// `None` lets the service infer the codec from the audio header.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub encoding: Option<AudioEncoding>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sample_rate_hertz: Option<u32>,
    pub language_code: String,
    pub enable_automatic_punctuation: bool,
}

/// A complete long-running recognition request.
///
/// The audio is referenced by its storage URI; the service fetches it itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub config: RecognitionConfig,
    pub audio_uri: String,
}
