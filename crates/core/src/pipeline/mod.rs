pub mod error;
pub mod job_logger;
pub mod operation_poller;
pub mod recognition_profile;
pub mod transcribe_job_use_case;
