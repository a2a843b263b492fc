//! Transunion Lead Feature Library
//!
//! Looks leads up at Transunion and flattens the nested response into scalar
//! features ready for a feature store.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `enrichment`: Fetch-then-normalize pipeline.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request, record and response models.
//! - `normalizer`: Lead record flattening.
//! - `transunion_client`: Transunion lead endpoint client.

pub mod api;
pub mod core;
pub mod integrations;

pub mod config;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod transunion_client;
