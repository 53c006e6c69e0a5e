use std::path::Path;

use crate::audio::domain::audio_probe::{AudioProbe, AudioProperties};
use crate::BoxError;

/// Reads stream parameters of the best audio stream using ffmpeg-next.
pub struct FfmpegAudioProbe;

impl AudioProbe for FfmpegAudioProbe {
    fn probe(&self, path: &Path) -> Result<AudioProperties, BoxError> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let audio_stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| format!("no audio stream in {}", path.display()))?;

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
        let decoder = codec_ctx.decoder().audio()?;

        let bit_rate = match decoder.bit_rate() {
            0 => None,
            rate => Some(rate as u64),
        };

        Ok(AudioProperties {
            sample_rate: decoder.rate(),
            channels: Some(decoder.channels() as u16),
            bit_rate,
        })
    }
}
