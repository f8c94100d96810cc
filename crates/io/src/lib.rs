//! `almacen-io` — file loading for supplier price lists and configuration.
//!
//! Everything here feeds the engine's raw row model; the engine itself
//! never touches the filesystem.

pub mod csv;
pub mod xlsx;

use std::path::Path;

use almacen_engine::model::{Cell, SheetSet};
use almacen_engine::registry::{SupplierConfig, SupplierRegistry};

/// Load the supplier registry from a TOML file.
pub fn load_registry(path: &Path) -> Result<SupplierRegistry, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    SupplierRegistry::from_toml(&content).map_err(|e| e.to_string())
}

/// Load a price list by extension: `.csv`/`.tsv`/`.txt` through the CSV
/// reader, anything else through calamine.
pub fn load_sheet(path: &Path) -> Result<Vec<Vec<Cell>>, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("csv") | Some("tsv") | Some("txt") => csv::import(path),
        _ => xlsx::import(path),
    }
}

/// Locate and load the conventional price-list file for one supplier under
/// `dir`: the folder hint (or registry key) with an xlsx/xls/ods/csv
/// extension. A missing file is `Ok(None)` — not every configured supplier
/// has a sheet on disk.
pub fn sheet_for_supplier(
    dir: &Path,
    key: &str,
    config: &SupplierConfig,
) -> Result<Option<Vec<Vec<Cell>>>, String> {
    let stem = config.folder.as_deref().unwrap_or(key);
    for ext in ["xlsx", "xls", "ods", "csv"] {
        let candidate = dir.join(format!("{stem}.{ext}"));
        if candidate.is_file() {
            return load_sheet(&candidate).map(Some);
        }
    }
    Ok(None)
}

/// Load every configured supplier's sheet found under `dir`.
pub fn load_sheet_set(dir: &Path, registry: &SupplierRegistry) -> Result<SheetSet, String> {
    let mut set = SheetSet::default();
    for (key, config) in &registry.suppliers {
        if let Some(rows) = sheet_for_supplier(dir, key, config)? {
            set.insert(key.clone(), rows);
        }
    }
    Ok(set)
}
