pub mod error;
pub mod model;
pub mod observer;
pub mod sheet;
