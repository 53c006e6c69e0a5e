use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gcs_transcribe_core::pipeline::recognition_profile::ProfileKind;
use gcs_transcribe_core::shared::constants::{
    DEFAULT_INITIAL_POLL_DELAY_SECS, DEFAULT_LANGUAGE_CODE, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_SAMPLE_RATE_HERTZ, DEFAULT_SPEECH_BASE_URL, DEFAULT_STORAGE_BASE_URL,
};
use gcs_transcribe_core::speech::domain::recognition_config::AudioEncoding;

/// Persistent defaults, overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: ProfileKind,
    pub language_code: String,
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub poll_interval_secs: u64,
    pub initial_poll_delay_secs: u64,
    pub credentials_path: Option<PathBuf>,
    pub storage_base_url: String,
    pub speech_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: ProfileKind::Fixed,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: DEFAULT_SAMPLE_RATE_HERTZ,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            initial_poll_delay_secs: DEFAULT_INITIAL_POLL_DELAY_SECS,
            credentials_path: None,
            storage_base_url: DEFAULT_STORAGE_BASE_URL.to_string(),
            speech_base_url: DEFAULT_SPEECH_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("gcs-transcribe").join("settings.json"))
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Read settings from `path`. A missing file gives defaults; a malformed one
    /// is reported and ignored.
    pub fn load_from(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Use a Cloud Storage emulator when `STORAGE_EMULATOR_HOST` is set.
    pub fn apply_storage_emulator(&mut self, host: Option<String>) {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            let host = host.trim();
            self.storage_base_url = if host.contains("://") {
                host.to_string()
            } else {
                format!("http://{host}")
            };
        }
    }
}
