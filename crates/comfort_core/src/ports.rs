//! crates/comfort_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the hosted row
//! store or the object bucket.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{FeedbackSubmission, SensorReading, VoiceNote};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the
/// REST store, the object bucket, DNS).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Inserts one submission row. Never updates or deletes.
    async fn insert(&self, submission: &FeedbackSubmission) -> PortResult<()>;

    /// Fetches the newest rows, ordered by timestamp descending, up to `limit`.
    async fn recent(&self, limit: usize) -> PortResult<Vec<FeedbackSubmission>>;

    /// One-row round trip used by the connectivity probe.
    async fn probe(&self) -> PortResult<()>;
}

#[async_trait]
pub trait SensorStore: Send + Sync {
    /// Inserts one sensor reading (device ingest or manual debug insert).
    async fn insert(&self, reading: &SensorReading) -> PortResult<()>;

    /// Fetches the newest readings, ordered by ts descending, up to `limit`.
    async fn recent(&self, limit: usize) -> PortResult<Vec<SensorReading>>;
}

#[async_trait]
pub trait VoiceNoteStore: Send + Sync {
    /// Inserts one voice note row.
    async fn insert(&self, note: &VoiceNote) -> PortResult<()>;

    /// Lists rows that carry audio (`audio_path` not null), newest first,
    /// optionally narrowed by a room substring and an exact feedback type.
    async fn with_audio(
        &self,
        room_contains: Option<&str>,
        feedback_type: Option<&str>,
    ) -> PortResult<Vec<VoiceNote>>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads a blob to the bucket under `path`, overwriting any existing
    /// object at that path.
    async fn upload(&self, path: &str, content_type: &str, data: Bytes) -> PortResult<()>;

    /// Creates a time-limited signed URL for reading `path` from the bucket.
    async fn signed_url(&self, path: &str, expires_in_seconds: u32) -> PortResult<String>;
}
