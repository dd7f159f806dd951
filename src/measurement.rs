//src/measurement.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("Measurement type cannot be empty.")]
    EmptyType,
    #[error("Invalid measurement value: {0}")]
    InvalidValue(f64),
}

impl MeasurementError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyType => "Please choose what you are measuring.".into(),
            Self::InvalidValue(_) => "Measurements must be a positive number.".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Measurement {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub date: DateTime<Utc>,
}

/// Append-only body measurement log, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MeasurementLog {
    entries: Vec<Measurement>,
}

impl MeasurementLog {
    pub fn new(entries: Vec<Measurement>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Measurement] {
        &self.entries
    }

    pub fn record(
        &mut self,
        kind: &str,
        value: f64,
        date: DateTime<Utc>,
    ) -> Result<&Measurement, MeasurementError> {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(MeasurementError::EmptyType);
        }
        if !value.is_finite() || value <= 0.0 {
            return Err(MeasurementError::InvalidValue(value));
        }
        let max_id = self.entries.iter().map(|m| m.id).max().unwrap_or(0);
        self.entries.push(Measurement {
            id: date.timestamp_millis().max(max_id + 1),
            kind: kind.to_lowercase(),
            value,
            date,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Entries of one type (case-insensitive), or all when `kind` is `None`. Newest first.
    pub fn list(&self, kind: Option<&str>) -> Vec<&Measurement> {
        let mut out: Vec<&Measurement> = self
            .entries
            .iter()
            .filter(|m| kind.map_or(true, |k| m.kind.eq_ignore_ascii_case(k.trim())))
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        out
    }

    pub fn latest(&self, kind: &str) -> Option<&Measurement> {
        self.list(Some(kind)).into_iter().next()
    }
}
