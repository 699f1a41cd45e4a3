//! Stress-test entry data model.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One logged stress-test session. Built only through
/// [`EntryValidator`](crate::entries::EntryValidator) and never edited afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub total_hours: f64,
    pub good_hours: f64,
    pub bad_hours: f64,
    /// Percentage of `total_hours` that produced good data, already rounded.
    pub efficiency: f64,
}

impl Entry {
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Creation time formatted in the local timezone, for tables.
    pub fn recorded_at_display(&self) -> String {
        format_local_millis(self.timestamp)
    }

    pub fn band(&self) -> EfficiencyBand {
        EfficiencyBand::from_efficiency(self.efficiency)
    }
}

/// Formats epoch milliseconds as a local `YYYY-MM-DD HH:MM`. Out-of-range
/// values fall back to the raw number.
pub fn format_local_millis(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => format!("@{timestamp_ms}ms"),
    }
}

/// Coarse efficiency grading used when coloring tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EfficiencyBand {
    High,
    Moderate,
    Low,
}

impl EfficiencyBand {
    pub const HIGH_THRESHOLD: f64 = 90.0;
    pub const MODERATE_THRESHOLD: f64 = 70.0;

    pub fn from_efficiency(efficiency: f64) -> Self {
        if efficiency >= Self::HIGH_THRESHOLD {
            EfficiencyBand::High
        } else if efficiency >= Self::MODERATE_THRESHOLD {
            EfficiencyBand::Moderate
        } else {
            EfficiencyBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyBand::High => "High",
            EfficiencyBand::Moderate => "Moderate",
            EfficiencyBand::Low => "Low",
        }
    }
}
