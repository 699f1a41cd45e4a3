use serde::{Deserialize, Serialize};

use crate::models::Entry;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    pub total_recording: f64,
    pub total_good: f64,
    pub total_bad: f64,
    /// Mean of the stored per-entry efficiencies, not `total_good / total_recording`.
    pub avg_efficiency: f64,
}

impl Default for AggregateSnapshot {
    fn default() -> Self {
        Self {
            total_recording: 0.0,
            total_good: 0.0,
            total_bad: 0.0,
            avg_efficiency: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CompositionLabel {
    Good,
    Bad,
}

impl CompositionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionLabel::Good => "good",
            CompositionLabel::Bad => "bad",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSlice {
    pub label: CompositionLabel,
    pub value: f64,
}

/// Always `[good, bad]`, in that order.
pub type CompositionView = [CompositionSlice; 2];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub timestamp: i64,
    pub efficiency: f64,
}

/// Oldest-first, one point per entry.
pub type TrendView = Vec<TrendPoint>;

/// Everything a dashboard render needs, computed in one pass over the entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub entries: Vec<Entry>,
    pub summary: AggregateSnapshot,
    pub composition: CompositionView,
    pub trend: TrendView,
}
