//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;
use std::time::Duration;

use comfort_core::domain::{FeedbackSubmission, SensorReading};
use comfort_core::ports::{FeedbackStore, ObjectStore, SensorStore, VoiceNoteStore};

use crate::config::Config;
use crate::web::cache::ReadCache;

/// Dashboard fetch cap for feedback rows.
pub const FEEDBACK_FETCH_CAP: usize = 2000;

/// Dashboard fetch cap for sensor rows.
pub const SENSOR_FETCH_CAP: usize = 5000;

/// How long a fetched row vector is reused before refetching.
pub const READ_CACHE_TTL: Duration = Duration::from_secs(60);

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub sensors: Arc<dyn SensorStore>,
    pub voice: Arc<dyn VoiceNoteStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub feedback_cache: ReadCache<FeedbackSubmission>,
    pub sensor_cache: ReadCache<SensorReading>,
    /// Startup connectivity-probe caption, rendered on every page.
    pub probe_caption: String,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        feedback: Arc<dyn FeedbackStore>,
        sensors: Arc<dyn SensorStore>,
        voice: Arc<dyn VoiceNoteStore>,
        objects: Arc<dyn ObjectStore>,
        probe_caption: String,
    ) -> Self {
        Self {
            config,
            feedback,
            sensors,
            voice,
            objects,
            feedback_cache: ReadCache::new(READ_CACHE_TTL),
            sensor_cache: ReadCache::new(READ_CACHE_TTL),
            probe_caption,
        }
    }
}
