//! Aggregate statistics and chart-ready views over the entry log.
//!
//! Everything here is a pure function of the entries passed in. Nothing is
//! cached between calls.

mod types;

pub use types::{
    AggregateSnapshot, CompositionLabel, CompositionSlice, CompositionView, DashboardSnapshot,
    TrendPoint, TrendView,
};

use crate::models::Entry;

pub fn summarize(entries: &[Entry]) -> AggregateSnapshot {
    if entries.is_empty() {
        return AggregateSnapshot::default();
    }

    let mut snapshot = AggregateSnapshot::default();
    let mut efficiency_sum = 0.0;
    for entry in entries {
        snapshot.total_recording += entry.total_hours;
        snapshot.total_good += entry.good_hours;
        snapshot.total_bad += entry.bad_hours;
        efficiency_sum += entry.efficiency;
    }
    snapshot.avg_efficiency = efficiency_sum / entries.len() as f64;

    snapshot
}

pub fn composition(entries: &[Entry]) -> CompositionView {
    composition_from(&summarize(entries))
}

fn composition_from(summary: &AggregateSnapshot) -> CompositionView {
    [
        CompositionSlice {
            label: CompositionLabel::Good,
            value: summary.total_good,
        },
        CompositionSlice {
            label: CompositionLabel::Bad,
            value: summary.total_bad,
        },
    ]
}

/// Entries are stored newest-first; the trend reads them back oldest-first.
pub fn trend(entries: &[Entry]) -> TrendView {
    entries
        .iter()
        .rev()
        .map(|entry| TrendPoint {
            timestamp: entry.timestamp,
            efficiency: entry.efficiency,
        })
        .collect()
}

pub fn dashboard(entries: &[Entry]) -> DashboardSnapshot {
    let summary = summarize(entries);
    DashboardSnapshot {
        entries: entries.to_vec(),
        composition: composition_from(&summary),
        trend: trend(entries),
        summary,
    }
}
