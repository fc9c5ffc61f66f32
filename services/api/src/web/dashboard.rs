//! services/api/src/web/dashboard.rs
//!
//! The feedback dashboard page: fetch (through the TTL cache), client-side
//! filtering, KPI cards, histograms, the hourly submission series, and the
//! latest-rows table. All aggregation is pure code in `comfort_core`; this
//! module only plumbs and renders.

use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use comfort_core::dashboard::{
    feedback_kpis, filter_feedback, hourly_counts, sensation_counts, value_counts, FeedbackFilter,
};
use comfort_core::domain::FeedbackSubmission;

use crate::web::html::{bar_rows, error_banner, esc, metric_card, page, table};
use crate::web::state::{AppState, FEEDBACK_FETCH_CAP};

/// Rows shown in the latest-rows table.
const LATEST_ROWS: usize = 200;

/// Filter selections carried in the query string.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub days: Option<i64>,
    pub room: Option<String>,
    pub clothing: Option<String>,
}

impl DashboardQuery {
    fn days_back(&self) -> i64 {
        self.days.unwrap_or(7).clamp(1, 30)
    }

    fn room(&self) -> Option<String> {
        self.room.as_deref().map(str::trim).filter(|r| !r.is_empty() && *r != "(all)").map(str::to_string)
    }

    fn clothing(&self) -> Option<String> {
        self.clothing.as_deref().map(str::trim).filter(|c| !c.is_empty() && *c != "(all)").map(str::to_string)
    }
}

/// GET /dashboard
pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let rows = match fetch_cached(&state).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("dashboard fetch failed: {}", e);
            let body = error_banner(&format!("Failed to fetch feedback: {}", e));
            return Html(page("Comfort Dashboard", &state.probe_caption, &body));
        }
    };

    if rows.is_empty() {
        let body = "<h1>Comfort Dashboard</h1><p>No feedback yet. Submit some entries on the main page.</p>";
        return Html(page("Comfort Dashboard", &state.probe_caption, body));
    }

    let filter = FeedbackFilter {
        days_back: query.days_back(),
        room: query.room(),
        clothing: query.clothing(),
        now: Utc::now(),
    };
    let view = filter_feedback(&rows, &filter);

    Html(page(
        "Comfort Dashboard",
        &state.probe_caption,
        &render(&rows, &view, &filter),
    ))
}

async fn fetch_cached(
    state: &AppState,
) -> comfort_core::ports::PortResult<Arc<Vec<FeedbackSubmission>>> {
    if let Some(rows) = state.feedback_cache.get().await {
        return Ok(rows);
    }
    let rows = state.feedback.recent(FEEDBACK_FETCH_CAP).await?;
    Ok(state.feedback_cache.put(rows).await)
}

fn render(
    all_rows: &[FeedbackSubmission],
    view: &[&FeedbackSubmission],
    filter: &FeedbackFilter,
) -> String {
    let mut b = String::new();
    b.push_str("<h1>Comfort Dashboard</h1>");
    b.push_str(&render_filter_form(all_rows, filter));

    if view.is_empty() {
        b.push_str("<p>No rows match the current filters.</p>");
        return b;
    }

    let kpis = feedback_kpis(view);
    b.push_str(r#"<div class="cards">"#);
    b.push_str(&metric_card("Submissions", &kpis.submissions.to_string(), ""));
    b.push_str(&metric_card("Rooms", &kpis.rooms.to_string(), ""));
    b.push_str(&metric_card(
        "Avg thermal sensation",
        &kpis
            .avg_thermal_sensation
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "\u{2014}".to_string()),
        "-3 cold \u{2192} +3 hot",
    ));
    b.push_str(&metric_card("Glare \u{2265} 4", &kpis.high_glare.to_string(), ""));
    b.push_str("</div>");

    b.push_str("<h2>Thermal sensation (counts)</h2>");
    let sensations: Vec<(String, usize)> = sensation_counts(view)
        .into_iter()
        .map(|(s, n)| (format!("{:+}", s), n))
        .collect();
    b.push_str(&bar_rows(&sensations));

    b.push_str("<h2>Brightness</h2>");
    b.push_str(&bar_rows(&value_counts(
        view.iter().filter_map(|r| r.brightness.as_deref()),
    )));

    b.push_str("<h2>Clothing</h2>");
    b.push_str(&bar_rows(&value_counts(
        view.iter().filter_map(|r| r.clothing.as_deref()),
    )));

    b.push_str("<h2>Submissions over time (hourly)</h2>");
    let times: Vec<_> = view.iter().map(|r| r.timestamp).collect();
    let hourly: Vec<(String, usize)> = hourly_counts(&times)
        .into_iter()
        .map(|(ts, n)| (ts.format("%m-%d %H:%M").to_string(), n))
        .collect();
    b.push_str(&bar_rows(&hourly));

    b.push_str("<h2>Latest rows</h2>");
    let mut latest: Vec<&&FeedbackSubmission> = view.iter().collect();
    latest.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
    let table_rows: Vec<Vec<String>> = latest
        .iter()
        .take(LATEST_ROWS)
        .map(|r| {
            vec![
                r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                r.room.clone().unwrap_or_else(|| "\u{2014}".to_string()),
                r.thermal_sensation.map(|v| format!("{:+}", v)).unwrap_or_default(),
                r.glare_rating.map(|v| v.to_string()).unwrap_or_default(),
                r.kss_score.map(|v| v.to_string()).unwrap_or_default(),
                r.clo_value.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                r.who5_scaled_0_100.map(|v| v.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    b.push_str(&table(
        &["Time (UTC)", "Room", "Thermal", "Glare", "KSS", "clo", "WHO-5"],
        &table_rows,
    ));

    b
}

fn render_filter_form(all_rows: &[FeedbackSubmission], filter: &FeedbackFilter) -> String {
    let rooms = value_counts(all_rows.iter().filter_map(|r| r.room.as_deref()));
    let clothing = value_counts(all_rows.iter().filter_map(|r| r.clothing.as_deref()));

    let mut b = String::from(r#"<form method="get" action="/dashboard" class="inline">"#);
    b.push_str(&format!(
        r#"<label>Days back <input type="number" name="days" min="1" max="30" value="{}"></label>"#,
        filter.days_back
    ));
    b.push_str(&select_with_all("room", &rooms, filter.room.as_deref()));
    b.push_str(&select_with_all("clothing", &clothing, filter.clothing.as_deref()));
    b.push_str(r#"<button type="submit">Apply</button></form>"#);
    b
}

fn select_with_all(name: &str, options: &[(String, usize)], selected: Option<&str>) -> String {
    let mut b = format!(
        r#"<label>{} <select name="{}"><option value="(all)">(all)</option>"#,
        esc(name),
        esc(name)
    );
    for (opt, _) in options {
        let sel = if Some(opt.as_str()) == selected { " selected" } else { "" };
        b.push_str(&format!(r#"<option{}>{}</option>"#, sel, esc(opt)));
    }
    b.push_str("</select></label>");
    b
}
