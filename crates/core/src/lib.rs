pub mod audio;
pub mod auth;
pub mod pipeline;
pub mod shared;
pub mod speech;
pub mod storage;

/// Error type returned across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
