//! crates/comfort_core/src/dashboard.rs
//!
//! Pure query-layer logic for the dashboard pages: client-side filtering of
//! fetched rows, the KPI aggregates, value-count histograms, and
//! time-bucketed means for charting. Handlers fetch rows through the ports
//! and feed them here; nothing in this module performs I/O.

use chrono::{DateTime, Duration, DurationRound, Utc};
use std::collections::BTreeMap;

use crate::domain::{FeedbackSubmission, SensorReading};

//=========================================================================================
// Filters
//=========================================================================================

/// Filter selections on the feedback dashboard. `now` is passed in by the
/// caller so the window cutoff is deterministic under test.
#[derive(Debug, Clone)]
pub struct FeedbackFilter {
    pub days_back: i64,
    pub room: Option<String>,
    pub clothing: Option<String>,
    pub now: DateTime<Utc>,
}

impl FeedbackFilter {
    fn matches(&self, row: &FeedbackSubmission) -> bool {
        if row.timestamp < self.now - Duration::days(self.days_back) {
            return false;
        }
        if let Some(room) = &self.room {
            if row.room.as_deref() != Some(room.as_str()) {
                return false;
            }
        }
        if let Some(clothing) = &self.clothing {
            if row.clothing.as_deref() != Some(clothing.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Applies the filter, keeping the input ordering.
pub fn filter_feedback<'a>(
    rows: &'a [FeedbackSubmission],
    filter: &FeedbackFilter,
) -> Vec<&'a FeedbackSubmission> {
    rows.iter().filter(|r| filter.matches(r)).collect()
}

/// Filter selections on the sensors dashboard.
#[derive(Debug, Clone)]
pub struct SensorFilter {
    pub days_back: i64,
    pub device_id: Option<String>,
    pub room: Option<String>,
    pub now: DateTime<Utc>,
}

impl SensorFilter {
    fn matches(&self, row: &SensorReading) -> bool {
        if row.ts < self.now - Duration::days(self.days_back) {
            return false;
        }
        if let Some(dev) = &self.device_id {
            if row.device_id != *dev {
                return false;
            }
        }
        if let Some(room) = &self.room {
            if row.room.as_deref() != Some(room.as_str()) {
                return false;
            }
        }
        true
    }
}

pub fn filter_sensors<'a>(
    rows: &'a [SensorReading],
    filter: &SensorFilter,
) -> Vec<&'a SensorReading> {
    rows.iter().filter(|r| filter.matches(r)).collect()
}

//=========================================================================================
// KPI aggregates
//=========================================================================================

/// Headline numbers on the feedback dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackKpis {
    pub submissions: usize,
    pub rooms: usize,
    pub avg_thermal_sensation: Option<f64>,
    pub high_glare: usize,
}

pub fn feedback_kpis(rows: &[&FeedbackSubmission]) -> FeedbackKpis {
    let sensations: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.thermal_sensation.map(f64::from))
        .collect();
    FeedbackKpis {
        submissions: rows.len(),
        rooms: distinct(rows.iter().filter_map(|r| r.room.as_deref())),
        avg_thermal_sensation: mean(&sensations),
        high_glare: rows
            .iter()
            .filter(|r| r.glare_rating.map_or(false, |g| g >= 4))
            .count(),
    }
}

/// Headline numbers on the sensors dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorKpis {
    pub rows: usize,
    pub devices: usize,
    pub avg_co2_ppm: Option<f64>,
    pub avg_lux: Option<f64>,
}

pub fn sensor_kpis(rows: &[&SensorReading]) -> SensorKpis {
    let co2: Vec<f64> = rows.iter().filter_map(|r| r.co2_ppm).collect();
    let lux: Vec<f64> = rows.iter().filter_map(|r| r.lux).collect();
    SensorKpis {
        rows: rows.len(),
        devices: distinct(rows.iter().map(|r| r.device_id.as_str())),
        avg_co2_ppm: mean(&co2),
        avg_lux: mean(&lux),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    let mut seen: Vec<&str> = values.collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

//=========================================================================================
// Histograms
//=========================================================================================

/// Occurrence counts of a label column, sorted ascending by label.
pub fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts.into_iter().map(|(k, n)| (k.to_string(), n)).collect()
}

/// Occurrence counts of the thermal-sensation column, sorted ascending by
/// scale point.
pub fn sensation_counts(rows: &[&FeedbackSubmission]) -> Vec<(i16, usize)> {
    let mut counts: BTreeMap<i16, usize> = BTreeMap::new();
    for r in rows {
        if let Some(s) = r.thermal_sensation {
            *counts.entry(s).or_insert(0) += 1;
        }
    }
    counts.into_iter().collect()
}

//=========================================================================================
// Time bucketing
//=========================================================================================

/// Selectable chart bin widths, mirroring the dashboard's bin picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBin {
    Min5,
    Min15,
    Min30,
    Hour1,
    Day1,
}

impl TimeBin {
    pub fn duration(self) -> Duration {
        match self {
            TimeBin::Min5 => Duration::minutes(5),
            TimeBin::Min15 => Duration::minutes(15),
            TimeBin::Min30 => Duration::minutes(30),
            TimeBin::Hour1 => Duration::hours(1),
            TimeBin::Day1 => Duration::days(1),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            TimeBin::Min5 => "5min",
            TimeBin::Min15 => "15min",
            TimeBin::Min30 => "30min",
            TimeBin::Hour1 => "1h",
            TimeBin::Day1 => "1d",
        }
    }

    pub fn from_key(key: &str) -> Option<TimeBin> {
        TimeBin::ALL.iter().copied().find(|b| b.key() == key)
    }

    pub const ALL: [TimeBin; 5] = [
        TimeBin::Min5,
        TimeBin::Min15,
        TimeBin::Min30,
        TimeBin::Hour1,
        TimeBin::Day1,
    ];
}

/// Buckets timestamped values onto `bin` boundaries and takes the mean of
/// each bucket, ascending in time. Points whose timestamp cannot be
/// truncated (out of chrono's range) are dropped.
pub fn bucketed_mean(
    points: &[(DateTime<Utc>, f64)],
    bin: TimeBin,
) -> Vec<(DateTime<Utc>, f64)> {
    let mut buckets: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
    for (ts, v) in points {
        if let Ok(bucket) = ts.duration_trunc(bin.duration()) {
            let entry = buckets.entry(bucket).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(ts, (sum, n))| (ts, sum / n as f64))
        .collect()
}

/// Submission counts per hour, ascending in time.
pub fn hourly_counts(times: &[DateTime<Utc>]) -> Vec<(DateTime<Utc>, usize)> {
    let mut buckets: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for ts in times {
        if let Ok(bucket) = ts.duration_trunc(Duration::hours(1)) {
            *buckets.entry(bucket).or_insert(0) += 1;
        }
    }
    buckets.into_iter().collect()
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 6, h, m, 0).unwrap()
    }

    fn submission(ts: DateTime<Utc>, room: &str, sensation: i16) -> FeedbackSubmission {
        FeedbackSubmission {
            id: uuid::Uuid::new_v4(),
            timestamp: ts,
            room: Some(room.to_string()),
            thermal_sensation: Some(sensation),
            ..FeedbackSubmission::default()
        }
    }

    #[test]
    fn filter_applies_window_and_room() {
        let now = at(12, 0);
        let rows = vec![
            submission(now - Duration::days(1), "Lab-101", 1),
            submission(now - Duration::days(10), "Lab-101", 2),
            submission(now - Duration::days(1), "Studio-2", 0),
        ];
        let filter = FeedbackFilter {
            days_back: 7,
            room: Some("Lab-101".to_string()),
            clothing: None,
            now,
        };
        let view = filter_feedback(&rows, &filter);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].thermal_sensation, Some(1));
    }

    #[test]
    fn kpis_count_rooms_and_high_glare() {
        let now = at(12, 0);
        let mut a = submission(now, "Lab-101", -1);
        a.glare_rating = Some(4);
        let mut b = submission(now, "Studio-2", 1);
        b.glare_rating = Some(2);
        let c = submission(now, "Lab-101", 0);

        let rows = vec![a, b, c];
        let refs: Vec<&FeedbackSubmission> = rows.iter().collect();
        let kpis = feedback_kpis(&refs);
        assert_eq!(kpis.submissions, 3);
        assert_eq!(kpis.rooms, 2);
        assert_eq!(kpis.high_glare, 1);
        assert_eq!(kpis.avg_thermal_sensation, Some(0.0));
    }

    #[test]
    fn empty_view_has_no_mean() {
        let kpis = feedback_kpis(&[]);
        assert_eq!(kpis.avg_thermal_sensation, None);
        assert_eq!(kpis.submissions, 0);
    }

    #[test]
    fn value_counts_sorted_by_label() {
        let labels = ["Sweater", "T-shirt", "Sweater", "Coat"];
        let counts = value_counts(labels.iter().copied());
        assert_eq!(
            counts,
            vec![
                ("Coat".to_string(), 1),
                ("Sweater".to_string(), 2),
                ("T-shirt".to_string(), 1),
            ]
        );
    }

    #[test]
    fn sensation_counts_sorted_by_scale_point() {
        let now = at(9, 0);
        let rows = vec![
            submission(now, "a", 2),
            submission(now, "a", -1),
            submission(now, "a", 2),
        ];
        let refs: Vec<&FeedbackSubmission> = rows.iter().collect();
        assert_eq!(sensation_counts(&refs), vec![(-1, 1), (2, 2)]);
    }

    #[test]
    fn bucketed_mean_lands_on_bin_boundaries() {
        let points = vec![
            (at(9, 2), 20.0),
            (at(9, 14), 24.0),
            (at(9, 31), 30.0),
        ];
        let series = bucketed_mean(&points, TimeBin::Min15);
        assert_eq!(
            series,
            vec![(at(9, 0), 22.0), (at(9, 30), 30.0)]
        );
    }

    #[test]
    fn hourly_counts_accumulate_per_hour() {
        let times = vec![at(9, 5), at(9, 55), at(11, 0)];
        assert_eq!(
            hourly_counts(&times),
            vec![(at(9, 0), 2), (at(11, 0), 1)]
        );
    }

    #[test]
    fn bin_keys_round_trip() {
        for b in TimeBin::ALL {
            assert_eq!(TimeBin::from_key(b.key()), Some(b));
        }
        assert_eq!(TimeBin::from_key("2h"), None);
    }
}
