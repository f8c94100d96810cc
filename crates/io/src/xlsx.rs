// Excel price-list import (xlsx, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use almacen_engine::model::Cell;

/// Import the first worksheet as raw rows. One-way conversion into the
/// engine's cell model; formatting and formulas are not carried over.
pub fn import(path: &Path) -> Result<Vec<Vec<Cell>>, String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| format!("{}: workbook has no sheets", path.display()))?;
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| format!("{}: {e}", path.display()))?;

    let mut rows = Vec::with_capacity(range.height());
    for row in range.rows() {
        rows.push(row.iter().map(to_cell).collect());
    }
    Ok(rows)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
        // Date cells occasionally show up in price columns; keep the serial
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
