//! # Machine Bridge Pipeline
//!
//! This crate provides the pipeline components for bridging machine
//! production events from the MQTT broker into OpenSearch.
//!
//! ## Architecture
//!
//! The pipeline follows a Supervisor-Handler-Writer pattern:
//!
//! 1. **Supervisor**: Owns the broker session, reconnects on disconnect, and
//!    delivers inbound messages serially
//! 2. **Handler**: Decodes each message and drives indexing and feedback
//! 3. **Writer**: Submits decoded documents to the search backend
//! 4. **Feedback**: Publishes the per-message outcome on the feedback topic

pub mod errors;
pub mod feedback;
pub mod handler;
pub mod supervisor;
pub mod writer;

pub use errors::PipelineError;
