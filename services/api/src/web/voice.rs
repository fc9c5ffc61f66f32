//! services/api/src/web/voice.rs
//!
//! The standalone voice feedback pages: the recorder page saves an uploaded
//! audio note (audio upload first, then one row insert), and the playback
//! page lists saved notes behind short-lived signed URLs.

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Html,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use comfort_core::domain::VoiceNote;

use crate::web::feedback::object_path;
use crate::web::html::{error_banner, esc, page, success_banner};
use crate::web::state::AppState;

/// Tag stored on every row written by this page.
const SOURCE_TAG: &str = "comfort-feedback-web";

const FEEDBACK_TYPES: [&str; 5] = ["thermal", "visual", "acoustic", "iaq", "other"];

//=========================================================================================
// Recorder
//=========================================================================================

/// GET /voice
pub async fn recorder_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(page("Voice Feedback", &state.probe_caption, &render_recorder(None)))
}

/// POST /voice: upload the audio, then insert one voice-note row.
pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, (StatusCode, String)> {
    let mut feedback_type = None;
    let mut room = None;
    let mut user_id = None;
    let mut transcript = None;
    let mut audio: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let content_type = field.content_type().unwrap_or("audio/wav").to_string();
                let data = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to read audio bytes: {}", e),
                    )
                })?;
                if !data.is_empty() {
                    audio = Some((content_type, data));
                }
            }
            other => {
                let value = field.text().await.map_err(|e| {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to read field '{}': {}", other, e),
                    )
                })?;
                let value = value.trim().to_string();
                let value = (!value.is_empty()).then_some(value);
                match other {
                    "feedback_type" => feedback_type = value,
                    "room" => room = value,
                    "user_id" => user_id = value,
                    "transcript" => transcript = value,
                    _ => {}
                }
            }
        }
    }

    let Some((content_type, data)) = audio else {
        return Ok(Html(page(
            "Voice Feedback",
            &state.probe_caption,
            &render_recorder(Some(error_banner(
                "No audio attached. Record or pick a file, then save again.",
            ))),
        )));
    };

    let id = Uuid::new_v4();
    let now = Utc::now();
    let path = object_path(now, id);

    // 1) upload audio, 2) insert row. No rollback if the insert fails.
    let outcome = async {
        state.objects.upload(&path, &content_type, data).await?;
        let note = VoiceNote {
            id,
            timestamp: now,
            feedback_type,
            feedback_text: transcript,
            room,
            user_id,
            audio_path: Some(path.clone()),
            audio_mime: Some(content_type),
            source: Some(SOURCE_TAG.to_string()),
        };
        state.voice.insert(&note).await
    }
    .await;

    let body = match outcome {
        Ok(()) => format!(
            "{}<p><a href=\"/playback\">Open the playback page to listen.</a></p>",
            success_banner("Saved! Your voice note was uploaded.")
        ),
        Err(e) => {
            error!("voice note save failed: {}", e);
            render_recorder(Some(error_banner(&format!("Save failed: {}", e))))
        }
    };
    Ok(Html(page("Voice Feedback", &state.probe_caption, &body)))
}

fn render_recorder(banner: Option<String>) -> String {
    let mut b = String::new();
    b.push_str("<h1>Voice Feedback</h1>");
    if let Some(banner) = banner {
        b.push_str(&banner);
    }
    b.push_str(r#"<p class="caption">Attach a short voice note (&le;15 s); we save the audio and transcript together.</p>"#);
    b.push_str(r#"<form method="post" action="/voice" enctype="multipart/form-data">
<label>Feedback type</label><select name="feedback_type">"#);
    for t in FEEDBACK_TYPES {
        b.push_str(&format!("<option>{}</option>", esc(t)));
    }
    b.push_str(r#"</select>
<label>Room / Zone ID</label><input type="text" name="room" placeholder="e.g., ARC_1119">
<label>User ID (optional)</label><input type="text" name="user_id" placeholder="netid or anonymous">
<label>Recording</label><input type="file" name="audio" accept="audio/*">
<label>Transcript (optional; typed if speech-to-text is unavailable)</label>
<textarea name="transcript"></textarea>
<p><button type="submit">Save voice feedback</button></p>
</form>"#);
    b
}

//=========================================================================================
// Playback
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct PlaybackQuery {
    pub room: Option<String>,
    pub kind: Option<String>,
}

/// GET /playback: rows with audio, newest first, behind signed URLs.
pub async fn playback_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlaybackQuery>,
) -> Html<String> {
    let room = query.room.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let kind = query.kind.as_deref().map(str::trim).filter(|k| !k.is_empty());

    let notes = match state.voice.with_audio(room, kind).await {
        Ok(notes) => notes,
        Err(e) => {
            error!("playback fetch failed: {}", e);
            let body = error_banner(&format!("Failed to fetch recordings: {}", e));
            return Html(page("Playback", &state.probe_caption, &body));
        }
    };

    let mut b = String::new();
    b.push_str("<h1>Playback</h1>");
    b.push_str(&render_playback_filters(room, kind));

    if notes.is_empty() {
        b.push_str("<p>No recordings yet.</p>");
        return Html(page("Playback", &state.probe_caption, &b));
    }

    for note in &notes {
        let label = format!(
            "{} \u{2022} {} \u{2022} {}",
            note.timestamp.format("%Y-%m-%d %H:%M"),
            note.room.as_deref().unwrap_or("\u{2014}"),
            note.feedback_type.as_deref().unwrap_or("\u{2014}"),
        );
        b.push_str(&format!("<details><summary>{}</summary>", esc(&label)));
        b.push_str(&format!(
            "<p>Transcript: {}</p>",
            esc(note.feedback_text.as_deref().unwrap_or("\u{2014}"))
        ));
        if let Some(path) = &note.audio_path {
            match state
                .objects
                .signed_url(path, state.config.signed_url_seconds)
                .await
            {
                Ok(url) => b.push_str(&format!(
                    r#"<audio controls src="{}"></audio>"#,
                    esc(&url)
                )),
                Err(e) => b.push_str(&error_banner(&format!(
                    "Could not create signed URL: {}",
                    e
                ))),
            }
        }
        b.push_str("</details>");
    }

    Html(page("Playback", &state.probe_caption, &b))
}

fn render_playback_filters(room: Option<&str>, kind: Option<&str>) -> String {
    let mut b = String::from(r#"<form method="get" action="/playback" class="inline">"#);
    b.push_str(&format!(
        r#"<label>Filter by room <input type="text" name="room" value="{}"></label>"#,
        esc(room.unwrap_or(""))
    ));
    b.push_str(r#"<label>Filter by type <select name="kind"><option value=""></option>"#);
    for t in FEEDBACK_TYPES {
        let sel = if Some(t) == kind { " selected" } else { "" };
        b.push_str(&format!(r#"<option{}>{}</option>"#, sel, esc(t)));
    }
    b.push_str(r#"</select></label><button type="submit">Apply</button></form>"#);
    b
}
