//! Terminal rendering of a sorted grid.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use spravochnik_fields::Entity;
use spravochnik_grid::SortAdapter;
use spravochnik_store::Session;

/// Widest cell shown; department descriptions can run to paragraphs.
const MAX_CELL_CHARS: usize = 60;

/// Width used when stdout is not a terminal.
const FALLBACK_WIDTH: u16 = 120;

fn terminal_table() -> Table {
    let (width, _) = crossterm::terminal::size().unwrap_or((FALLBACK_WIDTH, 0));
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width);
    table
}

/// One line of at most [`MAX_CELL_CHARS`] characters; longer text ends in `…`.
fn fit_cell(text: &str) -> String {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match line.char_indices().nth(MAX_CELL_CHARS) {
        None => line,
        Some(_) => {
            let mut kept: String = line.chars().take(MAX_CELL_CHARS - 1).collect();
            kept.push('…');
            kept
        }
    }
}

/// Render the editable columns of a view in view order. The identity column is hidden.
pub fn render_view<E: Entity, S: Session>(view: &SortAdapter<E, S>) -> anyhow::Result<Table> {
    let columns: Vec<usize> = (0..view.column_count())
        .filter(|&c| view.is_editable(c))
        .collect();

    let mut table = terminal_table();
    table.set_header(
        columns
            .iter()
            .map(|&c| view.header(c).unwrap_or_default()),
    );
    for row in 0..view.row_count() {
        let cells = columns
            .iter()
            .map(|&c| {
                view.display_value(row, c).map(|text| fit_cell(&text))
            })
            .collect::<Result<Vec<_>, _>>()?;
        table.add_row(cells);
    }
    Ok(table)
}
