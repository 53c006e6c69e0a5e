use std::path::Path;

use crate::BoxError;

/// Stream parameters read from an audio file's headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioProperties {
    pub sample_rate: u32,
    pub channels: Option<u16>,
    pub bit_rate: Option<u64>,
}

/// Domain interface for inspecting local audio without decoding it.
pub trait AudioProbe: Send {
    fn probe(&self, path: &Path) -> Result<AudioProperties, BoxError>;
}
