use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_LANGUAGE_CODE, DEFAULT_SAMPLE_RATE_HERTZ, PROBED_SOURCE_EXTENSION,
};
use crate::speech::domain::recognition_config::{AudioEncoding, RecognitionConfig};

/// How recognition parameters are chosen for a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionProfile {
    /// Codec and sample rate are configured up front; the source is passed through unchecked.
    Fixed {
        encoding: AudioEncoding,
        sample_rate_hertz: u32,
        language_code: String,
    },
    /// The source must be a `.{required_extension}` object; its sample rate is
    /// read from a downloaded copy and the codec is left to the service.
    Probed {
        language_code: String,
        required_extension: String,
    },
}

impl RecognitionProfile {
    pub fn fixed_default() -> Self {
        Self::Fixed {
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: DEFAULT_SAMPLE_RATE_HERTZ,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
        }
    }

    pub fn probed_default() -> Self {
        Self::Probed {
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            required_extension: PROBED_SOURCE_EXTENSION.to_string(),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Fixed { .. } => ProfileKind::Fixed,
            Self::Probed { .. } => ProfileKind::Probed,
        }
    }

    pub fn requires_probe(&self) -> bool {
        matches!(self, Self::Probed { .. })
    }

    pub fn language_code(&self) -> &str {
        match self {
            Self::Fixed { language_code, .. } | Self::Probed { language_code, .. } => language_code,
        }
    }

    /// Build the request config. `detected_sample_rate` is only used by the probed profile.
    pub fn config(&self, detected_sample_rate: Option<u32>) -> RecognitionConfig {
        match self {
            Self::Fixed {
                encoding,
                sample_rate_hertz,
                language_code,
            } => RecognitionConfig {
                encoding: Some(*encoding),
                sample_rate_hertz: Some(*sample_rate_hertz),
                language_code: language_code.clone(),
                enable_automatic_punctuation: true,
            },
            Self::Probed { language_code, .. } => RecognitionConfig {
                encoding: None,
                sample_rate_hertz: detected_sample_rate,
                language_code: language_code.clone(),
                enable_automatic_punctuation: true,
            },
        }
    }
}

/// Profile selector used by configuration and the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[default]
    Fixed,
    Probed,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Fixed => write!(f, "fixed"),
            ProfileKind::Probed => write!(f, "probed"),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(ProfileKind::Fixed),
            "probed" => Ok(ProfileKind::Probed),
            other => Err(format!(
                "unknown profile '{other}', expected 'fixed' or 'probed'"
            )),
        }
    }
}
