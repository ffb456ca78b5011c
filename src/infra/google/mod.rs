pub mod auth;
pub mod public_csv;
pub mod sheets;
