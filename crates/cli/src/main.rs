mod settings;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;

use gcs_transcribe_core::audio::domain::audio_probe::AudioProbe;
use gcs_transcribe_core::auth::domain::token_provider::TokenProvider;
use gcs_transcribe_core::auth::infrastructure::credentials::CredentialSource;
use gcs_transcribe_core::pipeline::error::TranscribeError;
use gcs_transcribe_core::pipeline::job_logger::LogJobLogger;
use gcs_transcribe_core::pipeline::operation_poller::OperationPoller;
use gcs_transcribe_core::pipeline::recognition_profile::{ProfileKind, RecognitionProfile};
use gcs_transcribe_core::pipeline::transcribe_job_use_case::TranscribeJobUseCase;
use gcs_transcribe_core::shared::constants::PROBED_SOURCE_EXTENSION;
use gcs_transcribe_core::speech::domain::recognition_config::AudioEncoding;
use gcs_transcribe_core::speech::infrastructure::google_speech_client::GoogleSpeechClient;
use gcs_transcribe_core::storage::infrastructure::gcs_object_store::GcsObjectStore;

use settings::Settings;

/// Transcribe an audio object in Cloud Storage and store the text next to it.
#[derive(Parser, Debug)]
#[command(name = "gcs-transcribe", version)]
struct Cli {
    /// Audio object to transcribe (gs://bucket/object).
    source: String,

    /// Transcript destination (gs://bucket[/object]); a random name is used if the object is omitted.
    destination: String,

    /// Recognition profile: fixed (configured codec and rate) or probed (rate read from the mp3).
    #[arg(long)]
    profile: Option<ProfileKind>,

    /// BCP-47 language code, e.g. ca-ES.
    #[arg(long)]
    language: Option<String>,

    /// Sample rate in Hz for the fixed profile.
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Audio encoding for the fixed profile, e.g. linear16, flac.
    #[arg(long)]
    encoding: Option<AudioEncoding>,

    /// Seconds between operation status checks.
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Service account key file (defaults to GOOGLE_APPLICATION_CREDENTIALS).
    #[arg(long)]
    credentials: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(std::env::args_os()) {
        match e {
            TranscribeError::Usage(usage) => eprint!("{usage}"),
            other => eprintln!("Error: {other}"),
        }
        process::exit(1);
    }
}

fn run(args: impl IntoIterator<Item = OsString>) -> Result<(), TranscribeError> {
    let cli = parse_args(args)?;

    let mut settings = Settings::load();
    settings.apply_storage_emulator(std::env::var("STORAGE_EMULATOR_HOST").ok());
    let settings = merge(settings, &cli);
    validate(&settings)?;

    let mut use_case = build_use_case(&settings)?;
    let report = use_case.execute(&cli.source, &cli.destination)?;
    use_case.logger().summary();

    if let Some(rate) = report.detected_sample_rate {
        log::info!("Source sample rate: {rate} Hz");
    }
    println!("{}", report.destination);
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<Cli, TranscribeError> {
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => Err(TranscribeError::Usage(e.to_string())),
    }
}

/// Flags override the settings file.
fn merge(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(profile) = cli.profile {
        settings.profile = profile;
    }
    if let Some(language) = &cli.language {
        settings.language_code = language.clone();
    }
    if let Some(rate) = cli.sample_rate {
        settings.sample_rate_hertz = rate;
    }
    if let Some(encoding) = cli.encoding {
        settings.encoding = encoding;
    }
    if let Some(interval) = cli.poll_interval {
        settings.poll_interval_secs = interval;
    }
    if let Some(path) = &cli.credentials {
        settings.credentials_path = Some(path.clone());
    }
    settings
}

fn validate(settings: &Settings) -> Result<(), TranscribeError> {
    if settings.language_code.trim().is_empty() {
        return Err(TranscribeError::Config(
            "Language code must not be empty".to_string(),
        ));
    }
    if settings.profile == ProfileKind::Fixed && settings.sample_rate_hertz == 0 {
        return Err(TranscribeError::Config(
            "Sample rate must be a positive number of Hz".to_string(),
        ));
    }
    if settings.poll_interval_secs == 0 {
        return Err(TranscribeError::Config(format!(
            "Poll interval must be at least 1 second, got {}",
            settings.poll_interval_secs
        )));
    }
    Ok(())
}

fn build_profile(settings: &Settings) -> RecognitionProfile {
    match settings.profile {
        ProfileKind::Fixed => RecognitionProfile::Fixed {
            encoding: settings.encoding,
            sample_rate_hertz: settings.sample_rate_hertz,
            language_code: settings.language_code.clone(),
        },
        ProfileKind::Probed => RecognitionProfile::Probed {
            language_code: settings.language_code.clone(),
            required_extension: PROBED_SOURCE_EXTENSION.to_string(),
        },
    }
}

fn build_probe() -> Box<dyn AudioProbe> {
    #[cfg(feature = "ffmpeg")]
    {
        Box::new(gcs_transcribe_core::audio::infrastructure::ffmpeg_audio_probe::FfmpegAudioProbe)
    }
    #[cfg(not(feature = "ffmpeg"))]
    {
        Box::new(gcs_transcribe_core::audio::infrastructure::symphonia_audio_probe::SymphoniaAudioProbe::new())
    }
}

fn build_use_case(settings: &Settings) -> Result<TranscribeJobUseCase, TranscribeError> {
    let config_err = |e: &dyn std::fmt::Display| TranscribeError::Config(e.to_string());

    let tokens: Arc<dyn TokenProvider> = CredentialSource::resolve(
        settings.credentials_path.as_deref(),
        |name| std::env::var(name).ok(),
    )
    .and_then(CredentialSource::into_provider)
    .map(Arc::from)
    .map_err(|e| config_err(&e))?;

    let store = GcsObjectStore::with_base_url(&settings.storage_base_url, Box::new(Arc::clone(&tokens)))
        .map_err(|e| config_err(&e))?;
    let service = GoogleSpeechClient::with_base_url(&settings.speech_base_url, Box::new(tokens))
        .map_err(|e| config_err(&e))?;

    let profile = build_profile(settings);
    let probe = profile.requires_probe().then(build_probe);
    log::info!(
        "Profile: {} (language {})",
        profile.kind(),
        profile.language_code()
    );

    let poller = OperationPoller::new(
        Duration::from_secs(settings.initial_poll_delay_secs),
        Duration::from_secs(settings.poll_interval_secs),
    );

    Ok(TranscribeJobUseCase::new(
        Box::new(store),
        Box::new(service),
        probe,
        profile,
        poller,
        Box::new(LogJobLogger::new()),
    ))
}
