use tracing::debug;

use crate::model::{Cell, PriceListEntry};
use crate::price;
use crate::registry::SupplierConfig;

/// Column indices bound from the header row. `None` means the field is
/// absent from this layout and entries get an empty value for it.
#[derive(Debug, Default, Clone, Copy)]
struct ColumnBinding {
    code: Option<usize>,
    name: Option<usize>,
    price: Option<usize>,
}

/// Parse one supplier's raw price list into normalized entries.
///
/// Pure function of its two inputs: rows before `header_row` are skipped,
/// the header row binds columns, every later non-empty row yields one
/// entry. Supplier name and owner always come from the config — a label
/// column in the sheet itself is informational only.
pub fn ingest(rows: &[Vec<Cell>], config: &SupplierConfig) -> Vec<PriceListEntry> {
    let Some(header) = rows.get(config.header_row) else {
        return Vec::new();
    };

    let columns = bind_columns(header, config);
    if columns.price.is_none() {
        debug!(supplier = %config.name, "no header cell matched a price alias");
    }

    let mut entries = Vec::new();
    for row in rows.iter().skip(config.header_row + 1) {
        if row.iter().all(Cell::is_empty) {
            continue;
        }

        let price_cell = columns
            .price
            .and_then(|i| row.get(i))
            .cloned()
            .unwrap_or(Cell::Empty);
        let parsed = price::parse(&price_cell);
        let raw_price = parsed.error.as_ref().map(|_| price_cell.as_text());

        entries.push(PriceListEntry {
            code: cell_text(row, columns.code),
            name: cell_text(row, columns.name),
            price: parsed.value,
            raw_price,
            supplier_name: config.name.clone(),
            owner: config.owner.clone(),
        });
    }
    entries
}

fn bind_columns(header: &[Cell], config: &SupplierConfig) -> ColumnBinding {
    ColumnBinding {
        code: find_column(header, &config.columns.code),
        name: find_column(header, &config.columns.name),
        price: find_column(header, &config.columns.price),
    }
}

/// First header cell whose trimmed text case-insensitively equals any alias.
fn find_column(header: &[Cell], aliases: &[String]) -> Option<usize> {
    header.iter().position(|cell| {
        let text = cell.as_text();
        let text = text.trim().to_lowercase();
        aliases.iter().any(|a| a.trim().to_lowercase() == text)
    })
}

fn cell_text(row: &[Cell], index: Option<usize>) -> String {
    index
        .and_then(|i| row.get(i))
        .map(|c| c.as_text().trim().to_string())
        .unwrap_or_default()
}
