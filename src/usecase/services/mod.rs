pub mod cleaning_service;
pub mod edit_service;
pub mod insight_service;
pub mod query_service;
