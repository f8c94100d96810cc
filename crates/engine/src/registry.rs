use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Static supplier configuration, loaded once and passed into the engine by
/// value. Read-only: nothing in the engine mutates it.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierRegistry {
    /// Fallback owner assigned when no association can be inferred.
    pub default_owner: String,
    /// Canonical supplier key -> sheet layout. A BTreeMap keeps registry
    /// iteration order stable across runs.
    pub suppliers: BTreeMap<String, SupplierConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierConfig {
    /// Display name attached to every entry produced from this supplier's
    /// sheet; also the label manual products are matched against.
    pub name: String,
    /// Owner key attached to every entry produced from this supplier's sheet.
    pub owner: String,
    /// Row index of the header row; earlier rows are skipped.
    #[serde(default)]
    pub header_row: usize,
    pub columns: ColumnAliases,
    /// File-name hint for locating this supplier's sheet under a storage
    /// directory. Falls back to the registry key.
    #[serde(default)]
    pub folder: Option<String>,
}

/// Candidate header spellings per logical field. The first header cell
/// matching any alias binds the column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnAliases {
    #[serde(default)]
    pub code: Vec<String>,
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub price: Vec<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SupplierRegistry {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let registry: SupplierRegistry =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.default_owner.trim().is_empty() {
            return Err(EngineError::ConfigValidation(
                "default_owner must not be blank".into(),
            ));
        }

        for (key, config) in &self.suppliers {
            if key.trim().is_empty() {
                return Err(EngineError::ConfigValidation(
                    "supplier key must not be blank".into(),
                ));
            }
            if config.name.trim().is_empty() {
                return Err(EngineError::ConfigValidation(format!(
                    "supplier '{key}': name must not be blank"
                )));
            }
            if config.owner.trim().is_empty() {
                return Err(EngineError::ConfigValidation(format!(
                    "supplier '{key}': owner must not be blank"
                )));
            }
            // Code and price columns may be absent from a layout; a sheet
            // without a name column yields nameless, unsearchable entries.
            if config.columns.name.is_empty() {
                return Err(EngineError::ConfigValidation(format!(
                    "supplier '{key}': at least one name column alias is required"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
