//src/stats.rs
use serde::{Deserialize, Serialize};

use crate::session::{SetEntry, WeightUnit, WorkoutSession};

/// Pounds per kilogram, as used for volume normalisation.
pub const LBS_PER_KG: f64 = 2.205;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    pub total_sets: u32,
    pub completed_sets: u32,
    pub total_volume: i64, // kg, rounded once over the whole workout
}

/// Set counts and total volume for a session.
///
/// Volume is summed over completed sets that have both a weight and a reps
/// value, with lbs converted to kg. The counting method is not consulted.
pub fn compute_stats(session: &WorkoutSession) -> WorkoutStats {
    let mut total_sets = 0u32;
    let mut completed_sets = 0u32;
    let mut volume = 0.0f64;

    for exercise in &session.exercises {
        total_sets += exercise.actual_sets.len() as u32;
        for set in exercise.actual_sets.iter().filter(|s| s.completed) {
            completed_sets += 1;
            volume += set_volume_kg(set, exercise.weight_unit);
        }
    }

    WorkoutStats {
        total_sets,
        completed_sets,
        total_volume: round_half_up(volume),
    }
}

/// Unrounded kg volume of a single set, or 0 when weight or reps is blank.
pub fn set_volume_kg(set: &SetEntry, unit: WeightUnit) -> f64 {
    if set.weight.is_empty() || set.reps.is_empty() {
        return 0.0;
    }
    let mut weight = parse_leading_float(&set.weight);
    if unit == WeightUnit::Lbs {
        weight /= LBS_PER_KG;
    }
    weight * parse_leading_int(&set.reps) as f64
}

/// Parses the longest numeric prefix ("62.5kg" -> 62.5). No number yields 0.
pub fn parse_leading_float(value: &str) -> f64 {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return 0.0;
    }
    // Exponent only counts when it has digits of its own.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parses a leading base-10 integer ("8.5" -> 8, "10 reps" -> 10). No number yields 0.
pub fn parse_leading_int(value: &str) -> i64 {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }
    s[..end].parse::<i64>().unwrap_or(0)
}

// Halves round toward positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Renders whole seconds as `H:MM:SS` from one hour up, otherwise `M:SS`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// Whole seconds between two millisecond timestamps; never negative.
pub fn elapsed_seconds(start_ms: i64, now_ms: i64) -> u64 {
    u64::try_from(now_ms.saturating_sub(start_ms) / 1000).unwrap_or(0)
}

/// A finished workout as stored in history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    #[serde(flatten)]
    pub session: WorkoutSession,
    pub end_time: i64,
    #[serde(default)]
    pub duration: u64, // seconds
    // Older records were saved without stats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<WorkoutStats>,
}

impl WorkoutRecord {
    pub fn finalize(session: WorkoutSession, stats: WorkoutStats, now: i64) -> Self {
        let duration = elapsed_seconds(session.start_time, now);
        Self {
            session,
            end_time: now,
            duration,
            stats: Some(stats),
        }
    }

    /// Stored stats, or stats recomputed from the raw sets when absent.
    pub fn stats_or_compute(&self) -> WorkoutStats {
        self.stats.unwrap_or_else(|| compute_stats(&self.session))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviousPerformance {
    pub date: i64, // start time of the workout it came from
    pub weight_unit: WeightUnit,
    pub sets: Vec<SetEntry>,
}

/// Completed sets from the most recent workout (history is newest first) that
/// included `exercise_name` and completed at least one set of it.
pub fn previous_performance(
    exercise_name: &str,
    history: &[WorkoutRecord],
) -> Option<PreviousPerformance> {
    history.iter().find_map(|record| {
        let exercise = record
            .session
            .exercises
            .iter()
            .find(|e| e.exercise.name == exercise_name)?;
        let sets: Vec<SetEntry> = exercise
            .actual_sets
            .iter()
            .filter(|s| s.completed)
            .cloned()
            .collect();
        (!sets.is_empty()).then(|| PreviousPerformance {
            date: record.session.start_time,
            weight_unit: exercise.weight_unit,
            sets,
        })
    })
}
