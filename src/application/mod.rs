pub mod engine;
pub mod service;
pub mod strategies;
pub mod worker;
