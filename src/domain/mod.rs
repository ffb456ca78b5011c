pub mod column;
pub mod entities;
pub mod mapper;
pub mod query;
pub mod summary;
