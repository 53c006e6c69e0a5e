#[cfg(feature = "ffmpeg")]
pub mod ffmpeg_audio_probe;
pub mod symphonia_audio_probe;
