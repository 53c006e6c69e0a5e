use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::audio::domain::audio_probe::{AudioProbe, AudioProperties};
use crate::BoxError;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognized audio in {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },
    #[error("no audio track in {0}")]
    NoTrack(PathBuf),
    #[error("sample rate not declared in {0}")]
    NoSampleRate(PathBuf),
}

/// Reads stream parameters from container and frame headers using symphonia.
#[derive(Debug, Default)]
pub struct SymphoniaAudioProbe;

impl SymphoniaAudioProbe {
    pub fn new() -> Self {
        Self
    }

    fn probe_file(&self, path: &Path) -> Result<AudioProperties, ProbeError> {
        let file = File::open(path).map_err(|e| ProbeError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| ProbeError::Format {
                path: path.to_path_buf(),
                source: e,
            })?;

        let track = probed
            .format
            .default_track()
            .ok_or_else(|| ProbeError::NoTrack(path.to_path_buf()))?;
        let params = &track.codec_params;

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| ProbeError::NoSampleRate(path.to_path_buf()))?;

        Ok(AudioProperties {
            sample_rate,
            channels: params.channels.map(|c| c.count() as u16),
            bit_rate: None,
        })
    }
}

impl AudioProbe for SymphoniaAudioProbe {
    fn probe(&self, path: &Path) -> Result<AudioProperties, BoxError> {
        Ok(self.probe_file(path)?)
    }
}
