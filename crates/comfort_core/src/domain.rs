//! crates/comfort_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One submitted comfort survey. Created once per form submission and never
/// updated or deleted by this system.
///
/// Numeric ranges (ASHRAE -3..3, glare 1..5, KSS 1..9, satisfaction 1..5,
/// WHO-5 0..25 raw) are constrained by the form widgets, not re-validated
/// here.
#[derive(Debug, Clone, Default)]
pub struct FeedbackSubmission {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub room: Option<String>,
    pub user_id: Option<String>,

    // Thermal comfort
    pub thermal_sensation: Option<i16>,
    pub thermal_preference: Option<String>,
    pub air_movement: Option<String>,
    pub thermal_notes: Option<String>,

    // Visual comfort
    pub brightness: Option<String>,
    pub glare_rating: Option<i16>,
    pub task_affected: bool,
    pub visual_notes: Option<String>,

    // Feeling / concentration
    pub mood: Option<String>,
    pub concentration: Option<i16>,
    pub productivity: Option<i16>,
    pub feeling_notes: Option<String>,

    // Sleepiness
    pub kss_score: Option<i16>,

    // Optional physiology and room snapshot
    pub rmssd_ms: Option<f64>,
    pub skin_temp_c: Option<f64>,
    pub light_lux: Option<f64>,
    pub co2_ppm: Option<f64>,

    // Clothing / activity model
    pub clothing: Option<String>,
    pub clo_value: Option<f64>,
    pub met_value: Option<f64>,

    // Symptoms (ECRHS-style yes/no matrix)
    pub symptom01: bool,
    pub symptom02: bool,
    pub symptom03: bool,
    pub symptom04: bool,
    pub symptom05: bool,
    pub symptom06: bool,
    pub symptom07: bool,
    pub symptom08: bool,
    pub symptom09: bool,
    pub symptom10: bool,
    pub symptom_notes: Option<String>,

    // Satisfaction matrix (1 = very dissatisfied .. 5 = very satisfied)
    pub sat_overall: Option<i16>,
    pub sat_privacy: Option<i16>,
    pub sat_layout: Option<i16>,
    pub sat_appearance: Option<i16>,
    pub sat_airmove: Option<i16>,
    pub sat_clean: Option<i16>,
    pub sat_view: Option<i16>,

    // WHO-5 well-being index
    pub who5_raw_sum: Option<i16>,
    pub who5_scaled_0_100: Option<i16>,

    // Optional voice note
    pub audio_path: Option<String>,
    pub audio_mime: Option<String>,
    pub audio_seconds: Option<f64>,
    pub voice_note_text: Option<String>,
}

/// One reading posted by a classroom sensor node (or the manual debug
/// insert). Read-only from this system's perspective once stored.
#[derive(Debug, Clone)]
pub struct SensorReading {
    pub device_id: String,
    pub room: Option<String>,
    pub ts: DateTime<Utc>,
    pub temp_c: Option<f64>,
    pub rh: Option<f64>,
    pub co2_ppm: Option<f64>,
    pub lux: Option<f64>,
}

/// A standalone voice feedback row saved from the recorder page.
#[derive(Debug, Clone)]
pub struct VoiceNote {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub feedback_type: Option<String>,
    pub feedback_text: Option<String>,
    pub room: Option<String>,
    pub user_id: Option<String>,
    pub audio_path: Option<String>,
    pub audio_mime: Option<String>,
    pub source: Option<String>,
}
