//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the JSON sensor-ingestion API and the
//! master definition for the OpenAPI specification. Devices post readings
//! here; everything human-facing lives on the HTML pages.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use comfort_core::domain::SensorReading;

use crate::web::state::{AppState, SENSOR_FETCH_CAP};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        ingest_reading_handler,
        list_readings_handler,
    ),
    components(
        schemas(SensorReadingPayload)
    ),
    tags(
        (name = "Comfort Feedback API", description = "Sensor ingestion and query endpoints for the classroom comfort service.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Payload Structs
//=========================================================================================

/// One sensor reading on the wire.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SensorReadingPayload {
    /// Stable identifier of the posting device.
    pub device_id: String,
    pub room: Option<String>,
    /// Reading time; defaults to the server clock when omitted.
    pub ts: Option<DateTime<Utc>>,
    pub temp_c: Option<f64>,
    pub rh: Option<f64>,
    pub co2_ppm: Option<f64>,
    pub lux: Option<f64>,
}

impl SensorReadingPayload {
    fn into_domain(self, now: DateTime<Utc>) -> SensorReading {
        SensorReading {
            device_id: self.device_id,
            room: self.room,
            ts: self.ts.unwrap_or(now),
            temp_c: self.temp_c,
            rh: self.rh,
            co2_ppm: self.co2_ppm,
            lux: self.lux,
        }
    }

    fn from_domain(r: SensorReading) -> Self {
        Self {
            device_id: r.device_id,
            room: r.room,
            ts: Some(r.ts),
            temp_c: r.temp_c,
            rh: r.rh,
            co2_ppm: r.co2_ppm,
            lux: r.lux,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListReadingsQuery {
    pub device_id: Option<String>,
    pub limit: Option<usize>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Ingest one sensor reading.
#[utoipa::path(
    post,
    path = "/api/readings",
    request_body = SensorReadingPayload,
    responses(
        (status = 201, description = "Reading stored"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn ingest_reading_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SensorReadingPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let reading = payload.into_domain(Utc::now());
    match state.sensors.insert(&reading).await {
        Ok(()) => {
            state.sensor_cache.invalidate().await;
            Ok(StatusCode::CREATED)
        }
        Err(e) => {
            error!("failed to store reading from {}: {}", reading.device_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store reading".to_string(),
            ))
        }
    }
}

/// List recent readings, newest first.
#[utoipa::path(
    get,
    path = "/api/readings",
    params(
        ("device_id" = Option<String>, Query, description = "Restrict to one device."),
        ("limit" = Option<usize>, Query, description = "Row cap, defaults to 500.")
    ),
    responses(
        (status = 200, description = "Recent readings", body = [SensorReadingPayload]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_readings_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListReadingsQuery>,
) -> Result<Json<Vec<SensorReadingPayload>>, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(500).min(SENSOR_FETCH_CAP);
    match state.sensors.recent(limit).await {
        Ok(rows) => {
            let rows = rows
                .into_iter()
                .filter(|r| {
                    query
                        .device_id
                        .as_deref()
                        .map_or(true, |dev| r.device_id == dev)
                })
                .map(SensorReadingPayload::from_domain)
                .collect();
            Ok(Json(rows))
        }
        Err(e) => {
            error!("failed to list readings: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list readings".to_string(),
            ))
        }
    }
}
