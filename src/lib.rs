pub mod api;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod derive;
pub mod filter;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod sample;
pub mod scoring;
pub mod source;
