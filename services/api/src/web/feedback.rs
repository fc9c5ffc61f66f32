//! services/api/src/web/feedback.rs
//!
//! The multi-section comfort survey: the form page (GET /) and the
//! submission writer (POST /feedback). Submission assembles the posted
//! widget values into one flat row, uploads the optional voice note to the
//! object store first, then performs a single insert. Either failure is
//! surfaced as an inline banner; there is no retry and no rollback of an
//! already-uploaded object.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Html,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use comfort_core::domain::FeedbackSubmission;
use comfort_core::ports::{FeedbackStore, ObjectStore, PortError};
use comfort_core::scoring::{
    comfort_indicator, resolve_clo, resolve_met, who5_score, Activity, CloBand, Garment,
};

use crate::web::html::{
    chip, error_banner, esc, glare_color, gradient_legend, kss_color, page, success_banner,
    thermal_color,
};
use crate::web::state::AppState;

//=========================================================================================
// Collected form data
//=========================================================================================

/// A voice note uploaded with the form.
pub struct UploadedAudio {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// The raw multipart form: text fields (repeatable, e.g. garment checkboxes)
/// plus the optional audio part.
#[derive(Default)]
pub struct FeedbackForm {
    fields: HashMap<String, Vec<String>>,
    pub audio: Option<UploadedAudio>,
}

impl FeedbackForm {
    fn push(&mut self, name: &str, value: String) {
        self.fields.entry(name.to_string()).or_default().push(value);
    }

    /// First non-empty value of a field, trimmed.
    fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)?
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    fn all(&self, name: &str) -> impl Iterator<Item = &str> {
        self.fields
            .get(name)
            .into_iter()
            .flatten()
            .map(|v| v.as_str())
    }

    fn checked(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    fn parse_i16(&self, name: &str) -> Option<i16> {
        self.first(name)?.parse().ok()
    }

    fn parse_f64(&self, name: &str) -> Option<f64> {
        self.first(name)?.parse().ok()
    }

    fn text(&self, name: &str) -> Option<String> {
        self.first(name).map(str::to_string)
    }
}

async fn collect_form(mut multipart: Multipart) -> Result<FeedbackForm, (StatusCode, String)> {
    let mut form = FeedbackForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "audio" {
            let file_name = field.file_name().unwrap_or("voice-note.wav").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("audio/wav")
                .to_string();
            let data = field.bytes().await.map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to read audio bytes: {}", e),
                )
            })?;
            // A file input with nothing picked still posts an empty part.
            if !data.is_empty() {
                form.audio = Some(UploadedAudio {
                    file_name,
                    content_type,
                    data,
                });
            }
        } else {
            let value = field.text().await.map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to read field '{}': {}", name, e),
                )
            })?;
            form.push(&name, value);
        }
    }
    Ok(form)
}

//=========================================================================================
// Assembly
//=========================================================================================

/// Assembles the posted widget values into one flat submission row,
/// running the CLO/MET resolution and WHO-5 scoring along the way.
pub fn build_submission(form: &FeedbackForm, id: Uuid, now: DateTime<Utc>) -> FeedbackSubmission {
    let garments: Vec<Garment> = form
        .all("garment")
        .filter_map(Garment::from_key)
        .collect();
    let band = form.first("clo_band").and_then(CloBand::from_key);
    let clo_value = resolve_clo(
        &garments,
        form.checked("accessory"),
        band,
        form.parse_f64("clo_slider"),
    );
    let activity = form.first("activity").and_then(Activity::from_key);
    let met_value = resolve_met(activity);

    // The WHO-5 block is optional; score only a fully answered set.
    let who5_items: Vec<i16> = (1..=5)
        .filter_map(|i| form.parse_i16(&format!("who5_q{}", i)))
        .collect();
    let who5 = <[i16; 5]>::try_from(who5_items).ok().map(who5_score);

    let mood = match form.first("mood") {
        Some("Other") => form.text("mood_other"),
        other => other.map(str::to_string),
    };

    FeedbackSubmission {
        id,
        timestamp: now,
        room: form.text("room"),
        user_id: form.text("user_id"),
        thermal_sensation: form.parse_i16("thermal_sensation"),
        thermal_preference: form.text("thermal_preference"),
        air_movement: form.text("air_movement"),
        thermal_notes: form.text("thermal_notes"),
        brightness: form.text("brightness"),
        glare_rating: form.parse_i16("glare_rating"),
        task_affected: form.checked("task_affected"),
        visual_notes: form.text("visual_notes"),
        mood,
        concentration: form.parse_i16("concentration"),
        productivity: form.parse_i16("productivity"),
        feeling_notes: form.text("feeling_notes"),
        kss_score: form.parse_i16("kss_score"),
        rmssd_ms: form.parse_f64("rmssd_ms"),
        skin_temp_c: form.parse_f64("skin_temp_c"),
        light_lux: form.parse_f64("light_lux"),
        co2_ppm: form.parse_f64("co2_ppm"),
        clothing: match form.first("clothing") {
            Some("Other") => form.text("clothing_other"),
            other => other.map(str::to_string),
        },
        clo_value: Some(clo_value),
        met_value: Some(met_value),
        symptom01: form.first("symptom01") == Some("yes"),
        symptom02: form.first("symptom02") == Some("yes"),
        symptom03: form.first("symptom03") == Some("yes"),
        symptom04: form.first("symptom04") == Some("yes"),
        symptom05: form.first("symptom05") == Some("yes"),
        symptom06: form.first("symptom06") == Some("yes"),
        symptom07: form.first("symptom07") == Some("yes"),
        symptom08: form.first("symptom08") == Some("yes"),
        symptom09: form.first("symptom09") == Some("yes"),
        symptom10: form.first("symptom10") == Some("yes"),
        symptom_notes: form.text("symptom_notes"),
        sat_overall: form.parse_i16("sat_overall"),
        sat_privacy: form.parse_i16("sat_privacy"),
        sat_layout: form.parse_i16("sat_layout"),
        sat_appearance: form.parse_i16("sat_appearance"),
        sat_airmove: form.parse_i16("sat_airmove"),
        sat_clean: form.parse_i16("sat_clean"),
        sat_view: form.parse_i16("sat_view"),
        who5_raw_sum: who5.map(|w| w.raw_sum),
        who5_scaled_0_100: who5.map(|w| w.scaled),
        audio_path: None,
        audio_mime: None,
        audio_seconds: None,
        voice_note_text: form.text("voice_note_text"),
    }
}

/// Bucket key for an uploaded voice note.
pub fn object_path(now: DateTime<Utc>, id: Uuid) -> String {
    format!("voice/{}_{}.wav", now.format("%Y%m%d_%H%M%S"), id.simple())
}

/// Best-effort duration of an uploaded WAV; anything unparsable is `None`.
pub fn wav_seconds(data: &[u8]) -> Option<f64> {
    let reader = hound::WavReader::new(std::io::Cursor::new(data)).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

/// Uploads the optional voice note, merges the resulting path into the row,
/// and performs the single insert. An upload failure downgrades to a warning
/// (the row is still written, without audio); an insert failure is the error.
/// An uploaded object whose insert then fails is left orphaned.
pub async fn persist(
    objects: &dyn ObjectStore,
    store: &dyn FeedbackStore,
    mut submission: FeedbackSubmission,
    audio: Option<UploadedAudio>,
) -> Result<(FeedbackSubmission, Vec<String>), PortError> {
    let mut warnings = Vec::new();

    if let Some(audio) = audio {
        let path = object_path(submission.timestamp, submission.id);
        match objects
            .upload(&path, &audio.content_type, audio.data.clone())
            .await
        {
            Ok(()) => {
                submission.audio_seconds = wav_seconds(&audio.data);
                submission.audio_mime = Some(audio.content_type);
                submission.audio_path = Some(path);
            }
            Err(e) => {
                warn!("audio upload failed for {}: {}", audio.file_name, e);
                warnings.push(format!("Audio upload failed: {}", e));
            }
        }
    }

    store.insert(&submission).await?;
    Ok((submission, warnings))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /, the survey form.
pub async fn form_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(page(
        "Classroom Comfort Feedback",
        &state.probe_caption,
        &render_form(),
    ))
}

/// POST /feedback, the submission writer.
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Html<String>, (StatusCode, String)> {
    let form = collect_form(multipart).await?;
    let submission = build_submission(&form, Uuid::new_v4(), Utc::now());

    match persist(
        state.objects.as_ref(),
        state.feedback.as_ref(),
        submission,
        form.audio,
    )
    .await
    {
        Ok((submission, warnings)) => {
            state.feedback_cache.invalidate().await;
            Ok(Html(page(
                "Feedback submitted",
                &state.probe_caption,
                &render_receipt(&submission, &warnings),
            )))
        }
        Err(e) => {
            error!("failed to submit feedback: {}", e);
            let body = format!(
                "{}\n{}",
                error_banner(&format!("Failed to submit: {}", e)),
                r#"<p><a href="/">Back to the form</a>; your entries were not saved.</p>"#
            );
            Ok(Html(page("Submission failed", &state.probe_caption, &body)))
        }
    }
}

//=========================================================================================
// Rendering
//=========================================================================================

fn radio_row(name: &str, options: &[&str], default: &str) -> String {
    let mut out = String::from(r#"<div class="inline">"#);
    for opt in options {
        let checked = if opt == &default { " checked" } else { "" };
        out.push_str(&format!(
            r#"<label><input type="radio" name="{}" value="{}"{}> {}</label>"#,
            esc(name),
            esc(opt),
            checked,
            esc(opt)
        ));
    }
    out.push_str("</div>");
    out
}

fn yes_no_row(code: &str, question: &str, name: &str) -> String {
    format!(
        r#"<tr><td>{}</td><td>{}</td><td><div class="inline">
<label><input type="radio" name="{n}" value="yes"> Yes</label>
<label><input type="radio" name="{n}" value="no" checked> No</label>
</div></td></tr>"#,
        esc(code),
        esc(question),
        n = esc(name)
    )
}

fn likert_row(label: &str, name: &str) -> String {
    format!(
        r#"<label>{}</label><input type="range" name="{}" min="1" max="5" value="3">"#,
        esc(label),
        esc(name)
    )
}

fn who5_row(idx: usize, question: &str) -> String {
    let mut opts = String::from(r#"<option value="">&mdash;</option>"#);
    for (v, label) in [
        (5, "All of the time"),
        (4, "Most of the time"),
        (3, "More than half of the time"),
        (2, "Less than half of the time"),
        (1, "Some of the time"),
        (0, "At no time"),
    ] {
        opts.push_str(&format!(r#"<option value="{}">{} &ndash; {}</option>"#, v, v, label));
    }
    format!(
        r#"<label>{}. {}</label><select name="who5_q{}">{}</select>"#,
        idx,
        esc(question),
        idx,
        opts
    )
}

fn render_form() -> String {
    let mut b = String::new();
    b.push_str("<h1>Classroom Comfort Feedback</h1>");
    b.push_str(r#"<form method="post" action="/feedback" enctype="multipart/form-data">"#);

    b.push_str(r#"<fieldset><label>Room/Location (optional)</label><input type="text" name="room">
<label>User ID (optional)</label><input type="text" name="user_id"></fieldset>"#);

    // 1) Thermal
    b.push_str("<h2>1) Thermal Comfort</h2>");
    b.push_str(r#"<label>Thermal sensation (ASHRAE 7-point, -3 Cold &hellip; +3 Hot)</label>
<input type="range" name="thermal_sensation" min="-3" max="3" value="0">"#);
    b.push_str(&gradient_legend(
        &[
            "#1e3a8a 0%", "#2563eb 16.6%", "#60a5fa 33.3%", "#e5e7eb 50%",
            "#fdba74 66.6%", "#f97316 83.3%", "#dc2626 100%",
        ],
        &["Cold", "Cool", "Slightly cool", "Neutral", "Slightly warm", "Warm", "Hot"],
    ));
    b.push_str("<label>Do you want it&hellip;</label>");
    b.push_str(&radio_row("thermal_preference", &["No change", "Warmer", "Cooler"], "No change"));
    b.push_str("<label>Air movement feels&hellip;</label>");
    b.push_str(&radio_row("air_movement", &["Still", "Slight breeze", "Drafty"], "Still"));
    b.push_str(r#"<label>Thermal notes (optional)</label><textarea name="thermal_notes" placeholder="e.g., warm near window; stuffy air&hellip;"></textarea>"#);

    // 2) Visual
    b.push_str("<h2>2) Visual Comfort</h2>");
    b.push_str("<label>Brightness level</label>");
    b.push_str(&radio_row("brightness", &["Too dim", "OK", "Too bright"], "OK"));
    b.push_str(r#"<label>Glare discomfort (1 = no glare, 5 = severe glare)</label>
<input type="range" name="glare_rating" min="1" max="5" value="2">"#);
    b.push_str(&gradient_legend(
        &["#000000 0%", "#6b7280 50%", "#fde047 100%"],
        &["Dark", "OK", "Too bright"],
    ));
    b.push_str(r#"<div class="inline"><label><input type="checkbox" name="task_affected"> Glare/brightness is affecting my task (screen/board/paper)</label></div>
<label>Visual notes (optional)</label><textarea name="visual_notes"></textarea>"#);

    // 3) Feeling / concentration
    b.push_str("<h2>3) Feeling / Concentration</h2>");
    b.push_str(r#"<label>How do you feel right now?</label><select name="mood">"#);
    for m in ["Happy", "Content/Neutral", "Tired", "Stressed/Anxious", "Irritated", "Other"] {
        b.push_str(&format!(r#"<option>{}</option>"#, m));
    }
    b.push_str(r#"</select><label>If other, please specify</label><input type="text" name="mood_other">"#);
    b.push_str(r#"<label>How focused were you during the last 10 minutes? (0&ndash;10)</label>
<input type="range" name="concentration" min="0" max="10" value="5">
<label>How productive do you feel right now? (0&ndash;10)</label>
<input type="range" name="productivity" min="0" max="10" value="5">
<label>Tell us a bit more (optional)</label><textarea name="feeling_notes"></textarea>"#);

    // 4) KSS
    b.push_str("<h2>4) Sleepiness / Fatigue (KSS)</h2>");
    b.push_str(r#"<label>How sleepy do you feel right now?</label><select name="kss_score">"#);
    for (v, label) in [
        (1, "Extremely alert"),
        (2, "Very alert"),
        (3, "Alert"),
        (4, "Rather alert"),
        (5, "Neither alert nor sleepy"),
        (6, "Some signs of sleepiness"),
        (7, "Sleepy, but no effort to stay awake"),
        (8, "Sleepy, some effort to stay awake"),
        (9, "Very sleepy, great effort to stay awake, fighting sleep"),
    ] {
        let selected = if v == 3 { " selected" } else { "" };
        b.push_str(&format!(r#"<option value="{}"{}>{} &ndash; {}</option>"#, v, selected, v, label));
    }
    b.push_str("</select>");

    // 5) Optional physiology + snapshot
    b.push_str(r#"<details><summary>Optional physiology (if wearing a device)</summary>
<label>HRV (RMSSD, ms)</label><input type="number" name="rmssd_ms" min="0" step="1">
<label>Skin temperature (&deg;C)</label><input type="number" name="skin_temp_c" min="0" step="0.1">
</details>
<details><summary>Light &amp; air snapshot (optional)</summary>
<label>Light level (lux)</label><input type="number" name="light_lux" min="0" step="1">
<label>CO&#8322; level (ppm)</label><input type="number" name="co2_ppm" min="0" step="50">
</details>"#);

    // 6) Clothing / activity
    b.push_str("<h2>5) What are you wearing?</h2>");
    b.push_str(r#"<label>Main clothing layer</label><select name="clothing">"#);
    for c in ["T-shirt", "Sweater", "Jacket", "Coat", "Other"] {
        b.push_str(&format!("<option>{}</option>", c));
    }
    b.push_str(r#"</select><label>If other, please specify</label><input type="text" name="clothing_other">"#);

    b.push_str(r#"<p>Tick every garment you are wearing (most accurate), or pick a band / use the slider:</p><div class="inline">"#);
    for g in Garment::ALL {
        b.push_str(&format!(
            r#"<label><input type="checkbox" name="garment" value="{}"> {} ({:.2} clo)</label>"#,
            g.key(),
            esc(g.label()),
            g.clo()
        ));
    }
    b.push_str(r#"</div><div class="inline"><label><input type="checkbox" name="accessory"> Wearing a scarf or cap (+5%)</label></div>"#);

    b.push_str(r#"<label>Clothing band (used when no garments are ticked)</label><select name="clo_band"><option value="">&mdash;</option>"#);
    for band in CloBand::ALL {
        b.push_str(&format!(r#"<option value="{}">{}</option>"#, band.key(), esc(band.label())));
    }
    b.push_str(r#"</select><label>Or estimate directly (clo)</label>
<input type="range" name="clo_slider" min="0.2" max="1.8" step="0.05" value="1.0">"#);

    b.push_str(r#"<label>What were you doing in the last 10 minutes?</label><select name="activity">"#);
    for a in Activity::ALL {
        b.push_str(&format!(
            r#"<option value="{}">{} ({:.1} met)</option>"#,
            a.key(),
            esc(a.label()),
            a.met()
        ));
    }
    b.push_str("</select>");

    // 7) Symptoms
    b.push_str("<h2>6) Symptoms</h2><p class=\"caption\">Modeled on the ECRHS style (tick Yes/No).</p>");
    b.push_str("<table><thead><tr><th>Code</th><th>Question</th><th>Response</th></tr></thead><tbody>");
    for (i, q) in SYMPTOM_QUESTIONS.iter().enumerate() {
        b.push_str(&yes_no_row(
            &format!("Q{}", i + 1),
            q,
            &format!("symptom{:02}", i + 1),
        ));
    }
    b.push_str("</tbody></table>");
    b.push_str(r#"<label>Symptoms notes (optional)</label><textarea name="symptom_notes"></textarea>"#);

    // 8) Satisfaction
    b.push_str("<h2>7) Satisfaction with the Space (1&ndash;5)</h2><p class=\"caption\">Scale: 1 = very dissatisfied &hellip; 5 = very satisfied</p>");
    for (name, q) in SATISFACTION_QUESTIONS {
        b.push_str(&likert_row(q, name));
    }

    // 9) WHO-5
    b.push_str("<h2>8) Well-being (WHO-5, over the last two weeks)</h2>");
    for (i, q) in WHO5_QUESTIONS.iter().enumerate() {
        b.push_str(&who5_row(i + 1, q));
    }

    // 10) Voice note
    b.push_str("<h2>9) Optional Voice Note</h2>");
    b.push_str(r#"<p class="caption">Attach a short recording (&le;15 s; wav/mp3/m4a). If your browser blocks the microphone, record with another app and upload the file.</p>
<input type="file" name="audio" accept="audio/*">
<label>Short summary (optional)</label><input type="text" name="voice_note_text" placeholder="e.g., tired; cold draft near window; glare on projector">"#);

    b.push_str(r#"<p><button type="submit">Submit Feedback</button></p></form>"#);
    b
}

const SYMPTOM_QUESTIONS: [&str; 10] = [
    "Have you had wheezing or whistling in your chest today?",
    "Have you felt short of breath while sitting or working indoors?",
    "Have you coughed during your time in this room?",
    "Have you had a blocked or runny nose indoors?",
    "Have you experienced itchy or watery eyes while indoors?",
    "Have you felt your throat was dry or irritated?",
    "Have you noticed any musty or damp smell?",
    "Have you had a headache while in this space?",
    "Have you felt unusually warm or cold in this space?",
    "Have you felt your concentration or mood was affected by the indoor environment?",
];

const SATISFACTION_QUESTIONS: [(&str, &str); 7] = [
    ("sat_overall", "How satisfied are you with the overall indoor environment of the classroom/studio?"),
    ("sat_privacy", "How satisfied are you with the level of privacy during class or studio work?"),
    ("sat_layout", "How satisfied are you with the layout and spatial organization of the classroom/studio?"),
    ("sat_appearance", "How satisfied are you with the color, decoration, or visual appearance of the space?"),
    ("sat_airmove", "How satisfied are you with the air movement or ventilation in the space?"),
    ("sat_clean", "How satisfied are you with the cleanliness and hygiene of the environment?"),
    ("sat_view", "How satisfied are you with the outdoor view or visual connection to the outside environment?"),
];

const WHO5_QUESTIONS: [&str; 5] = [
    "I have felt cheerful and in good spirits",
    "I have felt calm and relaxed",
    "I have felt active and vigorous",
    "I woke up feeling fresh and rested",
    "My daily life has been filled with things that interest me",
];

/// The post-submit receipt: success banner, derived-score chips, warnings.
fn render_receipt(submission: &FeedbackSubmission, warnings: &[String]) -> String {
    let mut b = String::new();
    b.push_str(&success_banner("Thanks! Your feedback was submitted."));
    for w in warnings {
        b.push_str(&error_banner(w));
    }

    if let Some(s) = submission.thermal_sensation {
        b.push_str(&chip(thermal_color(s), &format!("Thermal = {}", s)));
    }
    if let Some(g) = submission.glare_rating {
        b.push_str(&chip(glare_color(g), &format!("Glare = {}", g)));
    }
    if let Some(k) = submission.kss_score {
        b.push_str(&chip(kss_color(k), &format!("KSS = {}", k)));
    }
    if let Some(clo) = submission.clo_value {
        b.push_str(&chip("#93c5fd", &format!("Clothing = {:.2} clo", clo)));
    }

    if let (Some(sensation), Some(clo), Some(met)) = (
        submission.thermal_sensation,
        submission.clo_value,
        submission.met_value,
    ) {
        let ind = comfort_indicator(sensation, clo, met);
        b.push_str(&chip(
            thermal_color(ind.adjusted_sensation.round() as i16),
            &format!("Comfort indicator: {}", ind.band.label()),
        ));
        b.push_str(&format!(r#"<p class="caption">{}</p>"#, esc(ind.advisory())));
    }

    if let Some(scaled) = submission.who5_scaled_0_100 {
        let raw = submission.who5_raw_sum.unwrap_or(scaled / 4);
        b.push_str(&format!(
            r#"<p>WHO-5: raw {} / scaled {} &mdash; {}</p>"#,
            raw,
            scaled,
            esc(who5_tip_for(scaled))
        ));
    }

    b.push_str(r#"<p><a href="/">Submit another response</a> &middot; <a href="/dashboard">Open the dashboard</a></p>"#);
    b
}

fn who5_tip_for(scaled: i16) -> &'static str {
    comfort_core::scoring::who5::WellBeing {
        raw_sum: scaled / 4,
        scaled,
    }
    .tip()
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use comfort_core::ports::PortResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn form_with(pairs: &[(&str, &str)]) -> FeedbackForm {
        let mut form = FeedbackForm::default();
        for (k, v) in pairs {
            form.push(k, v.to_string());
        }
        form
    }

    #[test]
    fn builds_scores_from_widget_values() {
        let form = form_with(&[
            ("room", "Lab-101"),
            ("thermal_sensation", "2"),
            ("glare_rating", "4"),
            ("kss_score", "7"),
            ("garment", "t_shirt"),
            ("garment", "thin_trousers"),
            ("garment", "shoes"),
            ("clo_band", "heavy"),
            ("clo_slider", "1.8"),
            ("activity", "seated_typing"),
            ("who5_q1", "5"),
            ("who5_q2", "5"),
            ("who5_q3", "5"),
            ("who5_q4", "5"),
            ("who5_q5", "5"),
            ("symptom03", "yes"),
        ]);
        let s = build_submission(&form, Uuid::new_v4(), Utc::now());
        // Itemized garments win over the band and slider.
        assert_eq!(s.clo_value, Some(0.25));
        assert_eq!(s.met_value, Some(1.1));
        assert_eq!(s.who5_raw_sum, Some(25));
        assert_eq!(s.who5_scaled_0_100, Some(100));
        assert!(s.symptom03);
        assert!(!s.symptom04);
        assert_eq!(s.room.as_deref(), Some("Lab-101"));
    }

    #[test]
    fn band_used_when_no_garments_ticked() {
        let form = form_with(&[("clo_band", "medium"), ("clo_slider", "1.8")]);
        let s = build_submission(&form, Uuid::new_v4(), Utc::now());
        assert_eq!(s.clo_value, Some(0.90));
    }

    #[test]
    fn partial_who5_block_is_not_scored() {
        let form = form_with(&[("who5_q1", "5"), ("who5_q2", "4")]);
        let s = build_submission(&form, Uuid::new_v4(), Utc::now());
        assert_eq!(s.who5_raw_sum, None);
        assert_eq!(s.who5_scaled_0_100, None);
    }

    #[test]
    fn other_mood_uses_the_free_text() {
        let form = form_with(&[("mood", "Other"), ("mood_other", "overwhelmed")]);
        let s = build_submission(&form, Uuid::new_v4(), Utc::now());
        assert_eq!(s.mood.as_deref(), Some("overwhelmed"));
    }

    struct CountingObjectStore {
        uploads: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ObjectStore for CountingObjectStore {
        async fn upload(&self, _path: &str, _ct: &str, _data: Bytes) -> PortResult<()> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(PortError::Unexpected("bucket unavailable".to_string()))
            } else {
                Ok(())
            }
        }

        async fn signed_url(&self, _path: &str, _expires: u32) -> PortResult<String> {
            unreachable!("not used by the submission writer")
        }
    }

    #[derive(Default)]
    struct MemFeedbackStore {
        rows: Mutex<Vec<FeedbackSubmission>>,
    }

    #[async_trait]
    impl FeedbackStore for MemFeedbackStore {
        async fn insert(&self, submission: &FeedbackSubmission) -> PortResult<()> {
            self.rows.lock().unwrap().push(submission.clone());
            Ok(())
        }

        async fn recent(&self, _limit: usize) -> PortResult<Vec<FeedbackSubmission>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn probe(&self) -> PortResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn no_audio_means_no_object_store_call() {
        let objects = CountingObjectStore {
            uploads: AtomicUsize::new(0),
            fail: false,
        };
        let store = MemFeedbackStore::default();
        let submission = build_submission(&FeedbackForm::default(), Uuid::new_v4(), Utc::now());

        let (saved, warnings) = persist(&objects, &store, submission, None).await.unwrap();

        assert_eq!(objects.uploads.load(Ordering::SeqCst), 0);
        assert_eq!(saved.audio_path, None);
        assert!(warnings.is_empty());
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn audio_uploads_before_insert_and_sets_the_path() {
        let objects = CountingObjectStore {
            uploads: AtomicUsize::new(0),
            fail: false,
        };
        let store = MemFeedbackStore::default();
        let submission = build_submission(&FeedbackForm::default(), Uuid::new_v4(), Utc::now());
        let audio = UploadedAudio {
            file_name: "note.wav".to_string(),
            content_type: "audio/wav".to_string(),
            data: Bytes::from_static(b"not-really-wav"),
        };

        let (saved, warnings) = persist(&objects, &store, submission, Some(audio))
            .await
            .unwrap();

        assert_eq!(objects.uploads.load(Ordering::SeqCst), 1);
        let path = saved.audio_path.unwrap();
        assert!(path.starts_with("voice/"));
        assert!(path.ends_with(".wav"));
        assert_eq!(saved.audio_mime.as_deref(), Some("audio/wav"));
        // Unparsable bytes degrade to no duration, not an error.
        assert_eq!(saved.audio_seconds, None);
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn failed_upload_still_inserts_the_row_without_audio() {
        let objects = CountingObjectStore {
            uploads: AtomicUsize::new(0),
            fail: true,
        };
        let store = MemFeedbackStore::default();
        let submission = build_submission(&FeedbackForm::default(), Uuid::new_v4(), Utc::now());
        let audio = UploadedAudio {
            file_name: "note.wav".to_string(),
            content_type: "audio/wav".to_string(),
            data: Bytes::from_static(b"xx"),
        };

        let (saved, warnings) = persist(&objects, &store, submission, Some(audio))
            .await
            .unwrap();

        assert_eq!(saved.audio_path, None);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Audio upload failed"));
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[test]
    fn wav_duration_is_probed_from_the_header() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..8000 {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        let secs = wav_seconds(cursor.get_ref()).unwrap();
        assert!((secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn object_path_embeds_timestamp_and_id() {
        let ts: DateTime<Utc> = "2025-10-06T09:30:05Z".parse().unwrap();
        let id = Uuid::nil();
        assert_eq!(
            object_path(ts, id),
            format!("voice/20251006_093005_{}.wav", id.simple())
        );
    }
}
