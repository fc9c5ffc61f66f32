//! services/api/src/adapters/rest_store.rs
//!
//! This module contains the row-store adapter, the concrete implementation of
//! the `FeedbackStore`, `SensorStore`, and `VoiceNoteStore` ports. It talks
//! to the hosted relational backend over its PostgREST-style HTTPS interface
//! using `reqwest`: plain row selects with ordering/limit/filters, and single
//! row inserts. No transactions, no retries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use comfort_core::domain::{FeedbackSubmission, SensorReading, VoiceNote};
use comfort_core::ports::{FeedbackStore, PortError, PortResult, SensorStore, VoiceNoteStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST row-store adapter bound to one backend project and its three tables.
#[derive(Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    feedback_table: String,
    sensors_table: String,
    voice_table: String,
}

impl RestStore {
    /// Creates a new `RestStore`. `base_url` must already be normalized
    /// (no trailing slash).
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: String,
        feedback_table: String,
        sensors_table: String,
        voice_table: String,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            feedback_table,
            sensors_table,
            voice_table,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, rb: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        rb.header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(ACCEPT, "application/json")
    }

    async fn insert_row<T: Serialize>(&self, table: &str, row: &T) -> PortResult<()> {
        self.authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn select_rows<T: for<'de> Deserialize<'de>>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> PortResult<Vec<T>> {
        let resp = self
            .authed(self.http.get(self.table_url(table)))
            .query(query)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        resp.json::<Vec<T>>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

// Field names below are the backend column names; older rows may predate a
// column, so deserialization defaults every field.

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct FeedbackRow {
    id: Uuid,
    timestamp: DateTime<Utc>,
    room: Option<String>,
    user_id: Option<String>,
    thermal_sensation: Option<i16>,
    thermal_preference: Option<String>,
    air_movement: Option<String>,
    thermal_notes: Option<String>,
    brightness: Option<String>,
    glare_rating: Option<i16>,
    task_affected: bool,
    visual_notes: Option<String>,
    mood: Option<String>,
    concentration: Option<i16>,
    productivity: Option<i16>,
    feeling_notes: Option<String>,
    kss_score: Option<i16>,
    rmssd_ms: Option<f64>,
    skin_temp_c: Option<f64>,
    light_lux: Option<f64>,
    co2_ppm: Option<f64>,
    clothing: Option<String>,
    clo_value: Option<f64>,
    met_value: Option<f64>,
    symptom01: bool,
    symptom02: bool,
    symptom03: bool,
    symptom04: bool,
    symptom05: bool,
    symptom06: bool,
    symptom07: bool,
    symptom08: bool,
    symptom09: bool,
    symptom10: bool,
    symptom_notes: Option<String>,
    sat_overall: Option<i16>,
    sat_privacy: Option<i16>,
    sat_layout: Option<i16>,
    sat_appearance: Option<i16>,
    sat_airmove: Option<i16>,
    sat_clean: Option<i16>,
    sat_view: Option<i16>,
    who5_raw_sum: Option<i16>,
    who5_scaled_0_100: Option<i16>,
    audio_path: Option<String>,
    audio_mime: Option<String>,
    audio_seconds: Option<f64>,
    voice_note_text: Option<String>,
}

impl FeedbackRow {
    fn from_domain(s: &FeedbackSubmission) -> Self {
        Self {
            id: s.id,
            timestamp: s.timestamp,
            room: s.room.clone(),
            user_id: s.user_id.clone(),
            thermal_sensation: s.thermal_sensation,
            thermal_preference: s.thermal_preference.clone(),
            air_movement: s.air_movement.clone(),
            thermal_notes: s.thermal_notes.clone(),
            brightness: s.brightness.clone(),
            glare_rating: s.glare_rating,
            task_affected: s.task_affected,
            visual_notes: s.visual_notes.clone(),
            mood: s.mood.clone(),
            concentration: s.concentration,
            productivity: s.productivity,
            feeling_notes: s.feeling_notes.clone(),
            kss_score: s.kss_score,
            rmssd_ms: s.rmssd_ms,
            skin_temp_c: s.skin_temp_c,
            light_lux: s.light_lux,
            co2_ppm: s.co2_ppm,
            clothing: s.clothing.clone(),
            clo_value: s.clo_value,
            met_value: s.met_value,
            symptom01: s.symptom01,
            symptom02: s.symptom02,
            symptom03: s.symptom03,
            symptom04: s.symptom04,
            symptom05: s.symptom05,
            symptom06: s.symptom06,
            symptom07: s.symptom07,
            symptom08: s.symptom08,
            symptom09: s.symptom09,
            symptom10: s.symptom10,
            symptom_notes: s.symptom_notes.clone(),
            sat_overall: s.sat_overall,
            sat_privacy: s.sat_privacy,
            sat_layout: s.sat_layout,
            sat_appearance: s.sat_appearance,
            sat_airmove: s.sat_airmove,
            sat_clean: s.sat_clean,
            sat_view: s.sat_view,
            who5_raw_sum: s.who5_raw_sum,
            who5_scaled_0_100: s.who5_scaled_0_100,
            audio_path: s.audio_path.clone(),
            audio_mime: s.audio_mime.clone(),
            audio_seconds: s.audio_seconds,
            voice_note_text: s.voice_note_text.clone(),
        }
    }

    fn to_domain(self) -> FeedbackSubmission {
        FeedbackSubmission {
            id: self.id,
            timestamp: self.timestamp,
            room: self.room,
            user_id: self.user_id,
            thermal_sensation: self.thermal_sensation,
            thermal_preference: self.thermal_preference,
            air_movement: self.air_movement,
            thermal_notes: self.thermal_notes,
            brightness: self.brightness,
            glare_rating: self.glare_rating,
            task_affected: self.task_affected,
            visual_notes: self.visual_notes,
            mood: self.mood,
            concentration: self.concentration,
            productivity: self.productivity,
            feeling_notes: self.feeling_notes,
            kss_score: self.kss_score,
            rmssd_ms: self.rmssd_ms,
            skin_temp_c: self.skin_temp_c,
            light_lux: self.light_lux,
            co2_ppm: self.co2_ppm,
            clothing: self.clothing,
            clo_value: self.clo_value,
            met_value: self.met_value,
            symptom01: self.symptom01,
            symptom02: self.symptom02,
            symptom03: self.symptom03,
            symptom04: self.symptom04,
            symptom05: self.symptom05,
            symptom06: self.symptom06,
            symptom07: self.symptom07,
            symptom08: self.symptom08,
            symptom09: self.symptom09,
            symptom10: self.symptom10,
            symptom_notes: self.symptom_notes,
            sat_overall: self.sat_overall,
            sat_privacy: self.sat_privacy,
            sat_layout: self.sat_layout,
            sat_appearance: self.sat_appearance,
            sat_airmove: self.sat_airmove,
            sat_clean: self.sat_clean,
            sat_view: self.sat_view,
            who5_raw_sum: self.who5_raw_sum,
            who5_scaled_0_100: self.who5_scaled_0_100,
            audio_path: self.audio_path,
            audio_mime: self.audio_mime,
            audio_seconds: self.audio_seconds,
            voice_note_text: self.voice_note_text,
        }
    }
}

// Sensor rows use `ts` as the time column, matching the device firmware.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct SensorRow {
    device_id: Option<String>,
    room: Option<String>,
    ts: DateTime<Utc>,
    temp_c: Option<f64>,
    rh: Option<f64>,
    co2_ppm: Option<f64>,
    lux: Option<f64>,
}

impl SensorRow {
    fn from_domain(r: &SensorReading) -> Self {
        Self {
            device_id: Some(r.device_id.clone()),
            room: r.room.clone(),
            ts: r.ts,
            temp_c: r.temp_c,
            rh: r.rh,
            co2_ppm: r.co2_ppm,
            lux: r.lux,
        }
    }

    fn to_domain(self) -> SensorReading {
        SensorReading {
            device_id: self.device_id.unwrap_or_default(),
            room: self.room,
            ts: self.ts,
            temp_c: self.temp_c,
            rh: self.rh,
            co2_ppm: self.co2_ppm,
            lux: self.lux,
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct VoiceRow {
    id: Uuid,
    timestamp: DateTime<Utc>,
    feedback_type: Option<String>,
    feedback_text: Option<String>,
    room: Option<String>,
    user_id: Option<String>,
    audio_path: Option<String>,
    audio_mime: Option<String>,
    source: Option<String>,
}

impl VoiceRow {
    fn from_domain(n: &VoiceNote) -> Self {
        Self {
            id: n.id,
            timestamp: n.timestamp,
            feedback_type: n.feedback_type.clone(),
            feedback_text: n.feedback_text.clone(),
            room: n.room.clone(),
            user_id: n.user_id.clone(),
            audio_path: n.audio_path.clone(),
            audio_mime: n.audio_mime.clone(),
            source: n.source.clone(),
        }
    }

    fn to_domain(self) -> VoiceNote {
        VoiceNote {
            id: self.id,
            timestamp: self.timestamp,
            feedback_type: self.feedback_type,
            feedback_text: self.feedback_text,
            room: self.room,
            user_id: self.user_id,
            audio_path: self.audio_path,
            audio_mime: self.audio_mime,
            source: self.source,
        }
    }
}

//=========================================================================================
// Store Trait Implementations
//=========================================================================================

#[async_trait]
impl FeedbackStore for RestStore {
    async fn insert(&self, submission: &FeedbackSubmission) -> PortResult<()> {
        self.insert_row(&self.feedback_table, &FeedbackRow::from_domain(submission))
            .await
    }

    async fn recent(&self, limit: usize) -> PortResult<Vec<FeedbackSubmission>> {
        let rows: Vec<FeedbackRow> = self
            .select_rows(
                &self.feedback_table,
                &[
                    ("select", "*".to_string()),
                    ("order", "timestamp.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(FeedbackRow::to_domain).collect())
    }

    async fn probe(&self) -> PortResult<()> {
        // Cheapest possible round trip: one id from the feedback table.
        self.authed(self.http.get(self.table_url(&self.feedback_table)))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SensorStore for RestStore {
    async fn insert(&self, reading: &SensorReading) -> PortResult<()> {
        self.insert_row(&self.sensors_table, &SensorRow::from_domain(reading))
            .await
    }

    async fn recent(&self, limit: usize) -> PortResult<Vec<SensorReading>> {
        let rows: Vec<SensorRow> = self
            .select_rows(
                &self.sensors_table,
                &[
                    ("select", "*".to_string()),
                    ("order", "ts.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(SensorRow::to_domain).collect())
    }
}

#[async_trait]
impl VoiceNoteStore for RestStore {
    async fn insert(&self, note: &VoiceNote) -> PortResult<()> {
        self.insert_row(&self.voice_table, &VoiceRow::from_domain(note))
            .await
    }

    async fn with_audio(
        &self,
        room_contains: Option<&str>,
        feedback_type: Option<&str>,
    ) -> PortResult<Vec<VoiceNote>> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "timestamp.desc".to_string()),
            ("audio_path", "not.is.null".to_string()),
        ];
        if let Some(room) = room_contains {
            query.push(("room", format!("ilike.*{}*", room)));
        }
        if let Some(kind) = feedback_type {
            query.push(("feedback_type", format!("eq.{}", kind)));
        }
        let rows: Vec<VoiceRow> = self.select_rows(&self.voice_table, &query).await?;
        Ok(rows.into_iter().map(VoiceRow::to_domain).collect())
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_row_serializes_the_wire_column_names() {
        let mut s = FeedbackSubmission::default();
        s.id = Uuid::new_v4();
        s.thermal_sensation = Some(-2);
        s.who5_scaled_0_100 = Some(64);
        s.symptom07 = true;

        let json = serde_json::to_value(FeedbackRow::from_domain(&s)).unwrap();
        assert_eq!(json["thermal_sensation"], -2);
        assert_eq!(json["who5_scaled_0_100"], 64);
        assert_eq!(json["symptom07"], true);
        assert!(json["audio_path"].is_null());
    }

    #[test]
    fn feedback_row_tolerates_missing_columns_on_read() {
        // A row written by an early form version, before the WHO-5 block.
        let row: FeedbackRow = serde_json::from_str(
            r#"{"id":"5f0c1b2a-9a4e-4c3f-8f8e-2b1d4e5f6a70",
                "timestamp":"2025-10-06T12:00:00Z",
                "room":"Lab-101","thermal_sensation":1}"#,
        )
        .unwrap();
        let domain = row.to_domain();
        assert_eq!(domain.room.as_deref(), Some("Lab-101"));
        assert_eq!(domain.who5_raw_sum, None);
        assert!(!domain.symptom01);
    }

    #[test]
    fn sensor_row_round_trips_ts_column() {
        let reading = SensorReading {
            device_id: "esp32-classroom-01".to_string(),
            room: Some("Lab-101".to_string()),
            ts: "2025-10-06T09:30:00Z".parse().unwrap(),
            temp_c: Some(23.0),
            rh: Some(45.0),
            co2_ppm: Some(700.0),
            lux: Some(500.0),
        };
        let json = serde_json::to_value(SensorRow::from_domain(&reading)).unwrap();
        assert_eq!(json["device_id"], "esp32-classroom-01");
        assert!(json.get("ts").is_some());
        assert!(json.get("timestamp").is_none());
    }
}
