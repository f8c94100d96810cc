use tracing::warn;

use crate::registry::SupplierRegistry;

/// Resolve a user-supplied supplier key against the registry.
///
/// An exact key match wins. Otherwise both sides are case-folded: a single
/// folded match resolves, several resolve to the first in registry order
/// (a configuration defect, warned about), none is a miss. Callers treat a
/// miss as "no filter" — a bad filter must degrade, not error.
pub fn resolve<'r>(registry: &'r SupplierRegistry, key: &str) -> Option<&'r str> {
    if let Some((canonical, _)) = registry.suppliers.get_key_value(key) {
        return Some(canonical.as_str());
    }

    let folded = key.to_lowercase();
    let mut candidates = registry
        .suppliers
        .keys()
        .filter(|k| k.to_lowercase() == folded);

    let first = candidates.next()?;
    let extra = candidates.count();
    if extra > 0 {
        warn!(
            supplied = key,
            canonical = %first,
            ignored = extra,
            "ambiguous supplier key; using first registry match"
        );
    }
    Some(first.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ColumnAliases, SupplierConfig};
    use std::collections::BTreeMap;

    fn registry(keys: &[&str]) -> SupplierRegistry {
        let mut suppliers = BTreeMap::new();
        for key in keys {
            suppliers.insert(
                key.to_string(),
                SupplierConfig {
                    name: key.to_uppercase(),
                    owner: "ferreteria_general".into(),
                    header_row: 0,
                    columns: ColumnAliases::default(),
                    folder: None,
                },
            );
        }
        SupplierRegistry {
            default_owner: "ferreteria_general".into(),
            suppliers,
        }
    }

    #[test]
    fn exact_match_wins() {
        let reg = registry(&["jeluz", "sica"]);
        assert_eq!(resolve(&reg, "jeluz"), Some("jeluz"));
    }

    #[test]
    fn case_insensitive_fallback() {
        let reg = registry(&["jeluz"]);
        assert_eq!(resolve(&reg, "JELUZ"), Some("jeluz"));
        assert_eq!(resolve(&reg, "JeLuZ"), Some("jeluz"));
    }

    #[test]
    fn miss_is_none() {
        let reg = registry(&["jeluz"]);
        assert_eq!(resolve(&reg, "unknown"), None);
    }

    #[test]
    fn ambiguous_keys_pick_first_in_registry_order() {
        // Two keys folding to the same string: a config defect
        let reg = registry(&["Jeluz", "jeluz"]);
        assert_eq!(resolve(&reg, "JELUZ"), Some("Jeluz"));
        // Exact spelling still resolves exactly
        assert_eq!(resolve(&reg, "jeluz"), Some("jeluz"));
    }
}
