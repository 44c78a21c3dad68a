pub mod analytics;
pub mod config;
pub mod evolution;
pub mod logging;
pub mod runner;
pub mod simulator;
