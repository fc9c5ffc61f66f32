//! services/api/src/web/sensors.rs
//!
//! The sensors dashboard page (filters, KPIs, bucketed series, latest rows)
//! and the manual test-insert form used for debugging without a device.

use axum::{
    extract::{Form, Query, State},
    response::Html,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use comfort_core::dashboard::{
    bucketed_mean, filter_sensors, sensor_kpis, value_counts, SensorFilter, TimeBin,
};
use comfort_core::domain::SensorReading;

use crate::web::html::{error_banner, esc, metric_card, page, series_rows, success_banner, table};
use crate::web::state::{AppState, SENSOR_FETCH_CAP};

const LATEST_ROWS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct SensorsQuery {
    pub days: Option<i64>,
    pub device: Option<String>,
    pub room: Option<String>,
    pub bin: Option<String>,
}

impl SensorsQuery {
    fn days_back(&self) -> i64 {
        self.days.unwrap_or(7).clamp(1, 30)
    }

    fn choice(raw: Option<&str>) -> Option<String> {
        raw.map(str::trim)
            .filter(|v| !v.is_empty() && *v != "(all)")
            .map(str::to_string)
    }

    fn bin(&self) -> TimeBin {
        self.bin
            .as_deref()
            .and_then(TimeBin::from_key)
            .unwrap_or(TimeBin::Min30)
    }
}

/// GET /sensors
pub async fn sensors_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SensorsQuery>,
) -> Html<String> {
    let rows = match fetch_cached(&state).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("sensor fetch failed: {}", e);
            let body = format!(
                "{}{}",
                error_banner(&format!("Failed to fetch sensor readings: {}", e)),
                render_insert_form()
            );
            return Html(page("Sensor Readings", &state.probe_caption, &body));
        }
    };

    let mut b = String::new();
    b.push_str("<h1>Sensor Readings</h1>");

    if rows.is_empty() {
        b.push_str("<p>No sensor data yet. Use the insert tester below or your device to post readings.</p>");
        b.push_str(&render_insert_form());
        return Html(page("Sensor Readings", &state.probe_caption, &b));
    }

    let filter = SensorFilter {
        days_back: query.days_back(),
        device_id: SensorsQuery::choice(query.device.as_deref()),
        room: SensorsQuery::choice(query.room.as_deref()),
        now: Utc::now(),
    };
    let view = filter_sensors(&rows, &filter);
    let bin = query.bin();

    b.push_str(&render_filter_form(&rows, &filter, bin));

    let kpis = sensor_kpis(&view);
    b.push_str(r#"<div class="cards">"#);
    b.push_str(&metric_card("Rows", &kpis.rows.to_string(), ""));
    b.push_str(&metric_card("Devices", &kpis.devices.to_string(), ""));
    b.push_str(&metric_card(
        "Avg CO\u{2082} (ppm)",
        &kpis
            .avg_co2_ppm
            .map(|v| format!("{:.0}", v))
            .unwrap_or_else(|| "\u{2014}".to_string()),
        "ventilation proxy",
    ));
    b.push_str(&metric_card(
        "Avg Lux",
        &kpis
            .avg_lux
            .map(|v| format!("{:.0}", v))
            .unwrap_or_else(|| "\u{2014}".to_string()),
        "task plane",
    ));
    b.push_str("</div>");

    for (title, extract) in [
        ("Temperature (\u{b0}C)", (|r: &SensorReading| r.temp_c) as fn(&SensorReading) -> Option<f64>),
        ("Relative Humidity (%)", |r: &SensorReading| r.rh),
        ("CO\u{2082} (ppm)", |r: &SensorReading| r.co2_ppm),
        ("Illuminance (lux)", |r: &SensorReading| r.lux),
    ] {
        b.push_str(&format!("<h2>{}</h2>", title));
        let points: Vec<_> = view
            .iter()
            .filter_map(|r| extract(r).map(|v| (r.ts, v)))
            .collect();
        if points.is_empty() {
            b.push_str("<p class=\"caption\">No data in this window.</p>");
            continue;
        }
        let series: Vec<(String, f64)> = bucketed_mean(&points, bin)
            .into_iter()
            .map(|(ts, v)| (ts.format("%m-%d %H:%M").to_string(), v))
            .collect();
        b.push_str(&series_rows(&series));
    }

    b.push_str("<h2>Latest rows</h2>");
    let mut latest: Vec<&&SensorReading> = view.iter().collect();
    latest.sort_by_key(|r| std::cmp::Reverse(r.ts));
    let table_rows: Vec<Vec<String>> = latest
        .iter()
        .take(LATEST_ROWS)
        .map(|r| {
            vec![
                r.ts.format("%Y-%m-%d %H:%M").to_string(),
                r.device_id.clone(),
                r.room.clone().unwrap_or_else(|| "\u{2014}".to_string()),
                r.temp_c.map(|v| format!("{:.1}", v)).unwrap_or_default(),
                r.rh.map(|v| format!("{:.0}", v)).unwrap_or_default(),
                r.co2_ppm.map(|v| format!("{:.0}", v)).unwrap_or_default(),
                r.lux.map(|v| format!("{:.0}", v)).unwrap_or_default(),
            ]
        })
        .collect();
    b.push_str(&table(
        &["Time (UTC)", "Device", "Room", "\u{b0}C", "RH %", "CO\u{2082}", "Lux"],
        &table_rows,
    ));

    b.push_str(&render_insert_form());
    Html(page("Sensor Readings", &state.probe_caption, &b))
}

async fn fetch_cached(
    state: &AppState,
) -> comfort_core::ports::PortResult<Arc<Vec<SensorReading>>> {
    if let Some(rows) = state.sensor_cache.get().await {
        return Ok(rows);
    }
    let rows = state.sensors.recent(SENSOR_FETCH_CAP).await?;
    Ok(state.sensor_cache.put(rows).await)
}

//=========================================================================================
// Manual test insert
//=========================================================================================

// Numeric fields arrive as text; a cleared input posts an empty string,
// which must read as "not provided" rather than a deserialization error.
#[derive(Debug, Deserialize)]
pub struct SensorInsertForm {
    pub device_id: String,
    pub room: Option<String>,
    pub temp_c: Option<String>,
    pub rh: Option<String>,
    pub co2_ppm: Option<String>,
    pub lux: Option<String>,
}

fn parse_num(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()?.trim().parse().ok()
}

/// POST /sensors/insert, a debugging aid that mirrors what a device would post.
pub async fn insert_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SensorInsertForm>,
) -> Html<String> {
    let reading = SensorReading {
        device_id: form.device_id.trim().to_string(),
        room: form.room.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
        ts: Utc::now(),
        temp_c: parse_num(&form.temp_c),
        rh: parse_num(&form.rh),
        co2_ppm: parse_num(&form.co2_ppm),
        lux: parse_num(&form.lux),
    };

    match state.sensors.insert(&reading).await {
        Ok(()) => {
            state.sensor_cache.invalidate().await;
            Html(page(
                "Sensor Readings",
                &state.probe_caption,
                &format!(
                    "{}<p><a href=\"/sensors\">Back to the sensors dashboard</a></p>",
                    success_banner("Row inserted.")
                ),
            ))
        }
        Err(e) => {
            error!("manual sensor insert failed: {}", e);
            Html(page(
                "Sensor Readings",
                &state.probe_caption,
                &format!(
                    "{}<p><a href=\"/sensors\">Back to the sensors dashboard</a></p>",
                    error_banner(&format!("Insert failed: {}", e))
                ),
            ))
        }
    }
}

fn render_insert_form() -> String {
    r#"<details><summary>Manual test insert (for debugging)</summary>
<form method="post" action="/sensors/insert">
<label>device_id</label><input type="text" name="device_id" value="esp32-classroom-01">
<label>room</label><input type="text" name="room" value="Lab-101">
<label>temp_c</label><input type="number" name="temp_c" step="0.1" value="23.0">
<label>rh</label><input type="number" name="rh" step="1" value="45">
<label>co2_ppm</label><input type="number" name="co2_ppm" step="50" value="700">
<label>lux</label><input type="number" name="lux" step="10" value="500">
<p><button type="submit">Insert test row</button></p>
</form></details>"#
        .to_string()
}

fn render_filter_form(all_rows: &[SensorReading], filter: &SensorFilter, bin: TimeBin) -> String {
    let devices = value_counts(all_rows.iter().map(|r| r.device_id.as_str()));
    let rooms = value_counts(all_rows.iter().filter_map(|r| r.room.as_deref()));

    let mut b = String::from(r#"<form method="get" action="/sensors" class="inline">"#);
    b.push_str(&format!(
        r#"<label>Days back <input type="number" name="days" min="1" max="30" value="{}"></label>"#,
        filter.days_back
    ));

    for (name, options, selected) in [
        ("device", &devices, filter.device_id.as_deref()),
        ("room", &rooms, filter.room.as_deref()),
    ] {
        b.push_str(&format!(
            r#"<label>{} <select name="{}"><option value="(all)">(all)</option>"#,
            esc(name),
            esc(name)
        ));
        for (opt, _) in options {
            let sel = if Some(opt.as_str()) == selected { " selected" } else { "" };
            b.push_str(&format!(r#"<option{}>{}</option>"#, sel, esc(opt)));
        }
        b.push_str("</select></label>");
    }

    b.push_str(r#"<label>Time bin <select name="bin">"#);
    for candidate in TimeBin::ALL {
        let sel = if candidate == bin { " selected" } else { "" };
        b.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            candidate.key(),
            sel,
            candidate.key()
        ));
    }
    b.push_str(r#"</select></label><button type="submit">Apply</button></form>"#);
    b
}
