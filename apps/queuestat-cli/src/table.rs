//! Terminal tables

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use queuestat_core::SeriesMap;
use queuestat_erlang::LossRow;
use queuestat_stats::SummaryTuple;

fn base_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().copied());
    table
}

fn number(value: impl ToString) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Loss rows as capacity, seats, queue, loss
pub fn loss_table(rows: &[LossRow]) -> Table {
    let mut table = base_table(&["Node capacity", "Number of seats", "Queue capacity", "Loss probability"]);
    for row in rows {
        table.add_row(vec![
            number(row.capacity),
            number(row.servers),
            number(row.queue_size),
            number(format!("{:.6e}", row.loss_probability)),
        ]);
    }
    table
}

/// Labelled estimates grouped by their primary key
pub fn summary_table(title: &str, summaries: &SeriesMap<SummaryTuple>) -> Table {
    let mut table = base_table(&["Group", title, "Lower error", "Upper error"]);
    for (group, tuples) in summaries {
        for tuple in tuples {
            table.add_row(vec![
                Cell::new(format!("{group} / {}", tuple.label)),
                number(format!("{:.4}", tuple.estimate)),
                number(format!("{:.4}", tuple.lower_error)),
                number(format!("{:.4}", tuple.upper_error)),
            ]);
        }
    }
    table
}
