pub mod credentials;
pub mod service_account_token_provider;
pub mod static_token_provider;
