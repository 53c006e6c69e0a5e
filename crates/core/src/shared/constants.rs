pub const STORAGE_SCHEME: &str = "gs";

pub const DEFAULT_STORAGE_BASE_URL: &str = "https://storage.googleapis.com";
pub const DEFAULT_SPEECH_BASE_URL: &str = "https://speech.googleapis.com";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

pub const DEFAULT_LANGUAGE_CODE: &str = "ca-ES";
pub const DEFAULT_SAMPLE_RATE_HERTZ: u32 = 32000;

/// Container extension accepted by the probed profile.
pub const PROBED_SOURCE_EXTENSION: &str = "mp3";

pub const DEFAULT_OBJECT_NAME_LEN: usize = 5;
pub const TRANSCRIPT_EXTENSION: &str = "txt";

pub const DEFAULT_INITIAL_POLL_DELAY_SECS: u64 = 1;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Refresh cached access tokens this long before they expire.
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;
pub const SERVICE_ACCOUNT_TOKEN_LIFETIME_SECS: u64 = 3600;
