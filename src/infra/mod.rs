pub mod config;
pub mod gemini;
pub mod google;
pub mod import;
