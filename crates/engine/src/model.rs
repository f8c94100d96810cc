use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Raw sheet input
// ---------------------------------------------------------------------------

/// A single cell as loaded from a supplier's price-list file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Cell content as display text. Whole numbers render without a
    /// fractional part so `5000.0` reads back as `5000`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Pre-loaded price lists keyed by canonical supplier key.
#[derive(Debug, Default)]
pub struct SheetSet {
    pub sheets: HashMap<String, Vec<Vec<Cell>>>,
}

impl SheetSet {
    pub fn insert(&mut self, key: impl Into<String>, rows: Vec<Vec<Cell>>) {
        self.sheets.insert(key.into(), rows);
    }

    pub fn rows_for(&self, key: &str) -> Option<&[Vec<Cell>]> {
        self.sheets.get(key).map(Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// Catalog rows
// ---------------------------------------------------------------------------

/// A manually entered product as stored. `supplier_name` is a free-text
/// label, not a foreign key; `price` is kept as raw text until search time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualProduct {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub price: String,
    pub supplier_name: String,
    pub owner: String,
    pub observations: String,
}

/// One normalized row out of a supplier's price list. Ephemeral: produced
/// during a search, never persisted. Supplier name and owner come from the
/// registry entry, never from the sheet itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceListEntry {
    pub code: String,
    pub name: String,
    pub price: f64,
    /// Original price text, kept only when parsing failed.
    pub raw_price: Option<String>,
    pub supplier_name: String,
    pub owner: String,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Manual,
    Sheet,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Sheet => write!(f, "sheet"),
        }
    }
}

/// One search call's inputs. `supplier` and `owner` are optional filters.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: String,
    pub supplier: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRecord {
    pub code: String,
    pub name: String,
    pub price: f64,
    /// Original price text, present only when normalization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_price: Option<String>,
    pub supplier_name: String,
    pub observations: String,
    pub owner: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMeta {
    pub query: String,
    /// Supplier filter as supplied by the caller, if any.
    pub supplier_filter: Option<String>,
    /// Canonical registry key the filter resolved to.
    pub resolved_supplier: Option<String>,
    /// The filter did not resolve and was ignored.
    pub filter_dropped: bool,
    /// The supplier restriction was lifted after an empty result.
    pub broadened: bool,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub meta: SearchMeta,
    pub records: Vec<SearchRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_emptiness() {
        assert!(Cell::Empty.is_empty());
        assert!(Cell::Text("   ".into()).is_empty());
        assert!(!Cell::Text("x".into()).is_empty());
        assert!(!Cell::Number(0.0).is_empty());
    }

    #[test]
    fn cell_text_rendering() {
        assert_eq!(Cell::Number(5000.0).as_text(), "5000");
        assert_eq!(Cell::Number(12.5).as_text(), "12.5");
        assert_eq!(Cell::Text("TERM32A".into()).as_text(), "TERM32A");
        assert_eq!(Cell::Empty.as_text(), "");
    }

    #[test]
    fn sheet_set_lookup() {
        let mut set = SheetSet::default();
        set.insert("jeluz", vec![vec![Cell::Text("codigo".into())]]);
        assert!(set.rows_for("jeluz").is_some());
        assert!(set.rows_for("sica").is_none());
    }
}
