pub mod application_log;
pub mod opportunity_directory;
pub mod recommendation_store;
pub mod strategy;
pub mod user_directory;
