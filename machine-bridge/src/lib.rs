//! # Machine Bridge
//!
//! Main library for the machine production bridge.
//!
//! This crate provides the entry point and configuration for running the
//! MQTT to OpenSearch bridge.

pub mod config;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during bridge initialization or execution.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] machine_bridge_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] machine_bridge_repository::SearchError),

    /// Background task error.
    #[error("Task error: {0}")]
    TaskError(String),
}

impl BridgeError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a task error.
    pub fn task(msg: impl Into<String>) -> Self {
        Self::TaskError(msg.into())
    }
}
