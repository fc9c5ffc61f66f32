//! services/api/src/lib.rs
//!
//! Library root for the `api` service: configuration, the service-wide error
//! type, the port adapters, and the web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
