pub mod dataset;
pub mod edit;
pub mod record;
pub mod update;
