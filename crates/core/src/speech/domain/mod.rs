pub mod operation;
pub mod recognition_config;
pub mod transcript;
pub mod transcription_service;
