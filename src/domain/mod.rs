//! Core domain types and logic.

pub mod config;
pub mod config_validation;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod order;
pub mod portfolio;
pub mod report;
pub mod scoring;
pub mod strategy;
pub mod window;
