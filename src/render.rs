//! Plain-text tables for the terminal.

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::{
    entries::EntryCollection,
    metrics::{AggregateSnapshot, CompositionView, TrendView},
    models::{format_local_millis, EfficiencyBand, Entry},
};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn band_color(band: EfficiencyBand) -> Color {
    match band {
        EfficiencyBand::High => Color::Green,
        EfficiencyBand::Moderate => Color::Yellow,
        EfficiencyBand::Low => Color::Red,
    }
}

fn hours(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

fn percent(value: f64) -> Cell {
    Cell::new(format!("{value:.2}%")).set_alignment(CellAlignment::Right)
}

fn entry_row(entry: &Entry) -> Vec<Cell> {
    vec![
        Cell::new(entry.recorded_at_display()),
        hours(entry.total_hours),
        hours(entry.good_hours),
        hours(entry.bad_hours),
        percent(entry.efficiency).fg(band_color(entry.band())),
        Cell::new(&entry.id),
    ]
}

pub fn entries_table(entries: &EntryCollection) -> String {
    if entries.is_empty() {
        return "No entries yet. Add one with `stresslog add <total> <good> <bad>`.".into();
    }

    let mut table = new_table(vec!["Date", "Total h", "Good h", "Bad h", "Efficiency", "Id"]);
    for entry in entries {
        table.add_row(entry_row(entry));
    }
    table.to_string()
}

pub fn entry_table(entry: &Entry) -> String {
    let mut table = new_table(vec!["Date", "Total h", "Good h", "Bad h", "Efficiency", "Id"]);
    table.add_row(entry_row(entry));
    table.to_string()
}

pub fn summary_table(summary: &AggregateSnapshot, composition: &CompositionView) -> String {
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total recording (h)"), hours(summary.total_recording)]);
    table.add_row(vec![Cell::new("Good data (h)"), hours(summary.total_good)]);
    table.add_row(vec![Cell::new("Bad data (h)"), hours(summary.total_bad)]);
    table.add_row(vec![
        Cell::new("Average efficiency"),
        percent(summary.avg_efficiency)
            .fg(band_color(EfficiencyBand::from_efficiency(summary.avg_efficiency))),
    ]);

    let whole: f64 = composition.iter().map(|slice| slice.value).sum();
    for slice in composition {
        let share = if whole > 0.0 {
            slice.value / whole * 100.0
        } else {
            0.0
        };
        table.add_row(vec![
            Cell::new(format!("Share {}", slice.label.as_str())),
            percent(share),
        ]);
    }
    table.to_string()
}

pub fn trend_table(trend: &TrendView) -> String {
    if trend.is_empty() {
        return "No entries yet.".into();
    }

    let mut table = new_table(vec!["Date", "Efficiency"]);
    for point in trend {
        table.add_row(vec![
            Cell::new(format_local_millis(point.timestamp)),
            percent(point.efficiency).fg(band_color(EfficiencyBand::from_efficiency(
                point.efficiency,
            ))),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;

    fn sample() -> EntryCollection {
        EntryCollection::from_entries(vec![
            Entry {
                id: "newer".into(),
                timestamp: 1_700_000_360_000,
                total_hours: 24.0,
                good_hours: 19.0,
                bad_hours: 5.0,
                efficiency: 79.17,
            },
            Entry {
                id: "older".into(),
                timestamp: 1_700_000_000_000,
                total_hours: 24.0,
                good_hours: 22.0,
                bad_hours: 2.0,
                efficiency: 91.67,
            },
        ])
    }

    #[test]
    fn test_entries_table_lists_every_entry() {
        let rendered = entries_table(&sample());
        assert!(rendered.contains("newer"));
        assert!(rendered.contains("older"));
        assert!(rendered.contains("79.17%"));
        assert!(rendered.contains("22.00"));
        assert!(rendered.find("newer") < rendered.find("older"));
    }

    #[test]
    fn test_empty_views_render_hint() {
        assert!(entries_table(&EntryCollection::new()).starts_with("No entries yet"));
        assert_eq!(trend_table(&Vec::new()), "No entries yet.");
    }

    #[test]
    fn test_summary_table_shows_totals_and_shares() {
        let entries = sample();
        let rendered = summary_table(
            &metrics::summarize(entries.as_slice()),
            &metrics::composition(entries.as_slice()),
        );
        assert!(rendered.contains("48.00"));
        assert!(rendered.contains("85.42%"));
        assert!(rendered.contains("Share good"));
        assert!(rendered.contains("Share bad"));
    }

    #[test]
    fn test_summary_of_nothing_has_zero_shares() {
        let rendered = summary_table(&AggregateSnapshot::default(), &metrics::composition(&[]));
        assert!(rendered.contains("0.00%"));
    }

    #[test]
    fn test_trend_table_is_oldest_first() {
        let rendered = trend_table(&metrics::trend(sample().as_slice()));
        assert!(rendered.find("91.67%") < rendered.find("79.17%"));
    }
}
