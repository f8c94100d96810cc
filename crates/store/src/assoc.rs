// Supplier-owner association maintenance

use std::collections::BTreeSet;

use rusqlite::params;
use serde::Serialize;
use tracing::warn;

use crate::catalog::Catalog;
use crate::error::StoreError;

/// A supplier as seen from an owner's view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierRef {
    pub id: i64,
    pub name: String,
}

/// Outcome of a repair sweep. A sweep never aborts on a bad row; failures
/// are itemized here instead.
#[derive(Debug, Default, Serialize)]
pub struct RepairReport {
    pub repaired: usize,
    pub defaulted: usize,
    pub notices: Vec<String>,
    pub errors: Vec<String>,
}

impl Catalog {
    /// Owner keys linked to a supplier.
    pub fn owners_for_supplier(&self, supplier_id: i64) -> Result<BTreeSet<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT owner FROM supplier_owner_links WHERE supplier_id = ?1")?;
        let iter = stmt.query_map(params![supplier_id], |row| row.get::<_, String>(0))?;
        let mut owners = BTreeSet::new();
        for owner in iter {
            owners.insert(owner?);
        }
        Ok(owners)
    }

    /// Suppliers linked to an owner, ordered by display name.
    pub fn suppliers_for_owner(&self, owner: &str) -> Result<Vec<SupplierRef>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.name FROM suppliers s
             JOIN supplier_owner_links l ON l.supplier_id = s.id
             WHERE lower(l.owner) = lower(?1)
             ORDER BY s.name",
        )?;
        let iter = stmt.query_map(params![owner], |row| {
            Ok(SupplierRef {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let mut suppliers = Vec::new();
        for supplier in iter {
            suppliers.push(supplier?);
        }
        Ok(suppliers)
    }

    /// Idempotent link insert; a duplicate pair is a no-op.
    pub fn add_association(&self, supplier_id: i64, owner: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO supplier_owner_links (supplier_id, owner) VALUES (?1, ?2)",
            params![supplier_id, owner],
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Repairs
    // -----------------------------------------------------------------------

    /// Remove links whose supplier row no longer exists.
    pub fn repair_orphans(&self) -> Result<RepairReport, StoreError> {
        let mut report = RepairReport::default();

        let orphans: Vec<(i64, String)> = {
            let mut stmt = self.conn.prepare(
                "SELECT supplier_id, owner FROM supplier_owner_links
                 WHERE supplier_id NOT IN (SELECT id FROM suppliers)",
            )?;
            let iter = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let mut rows = Vec::new();
            for row in iter {
                rows.push(row?);
            }
            rows
        };

        for (supplier_id, owner) in orphans {
            match self.conn.execute(
                "DELETE FROM supplier_owner_links WHERE supplier_id = ?1 AND owner = ?2",
                params![supplier_id, owner],
            ) {
                Ok(_) => report.repaired += 1,
                Err(e) => report
                    .errors
                    .push(format!("link ({supplier_id}, {owner}): {e}")),
            }
        }
        Ok(report)
    }

    /// Give every linkless supplier at least one owner link: inferred from
    /// manual products carrying the supplier's label, or `default_owner`
    /// when nothing can be inferred.
    pub fn repair_missing(&self, default_owner: &str) -> Result<RepairReport, StoreError> {
        let mut report = RepairReport::default();

        let missing: Vec<(i64, String)> = {
            let mut stmt = self.conn.prepare(
                "SELECT id, name FROM suppliers
                 WHERE id NOT IN (SELECT supplier_id FROM supplier_owner_links)",
            )?;
            let iter = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let mut rows = Vec::new();
            for row in iter {
                rows.push(row?);
            }
            rows
        };

        for (id, name) in missing {
            match self.infer_owners(&name) {
                Ok(owners) if !owners.is_empty() => {
                    let mut linked = false;
                    for owner in owners {
                        match self.add_association(id, &owner) {
                            Ok(()) => linked = true,
                            Err(e) => report.errors.push(format!("supplier '{name}': {e}")),
                        }
                    }
                    if linked {
                        report.repaired += 1;
                    }
                }
                Ok(_) => {
                    warn!(
                        supplier = %name,
                        owner = default_owner,
                        "no owner inferable from manual products; assigning default"
                    );
                    match self.add_association(id, default_owner) {
                        Ok(()) => {
                            report.defaulted += 1;
                            report.notices.push(format!(
                                "supplier '{name}' assigned default owner '{default_owner}'"
                            ));
                        }
                        Err(e) => report.errors.push(format!("supplier '{name}': {e}")),
                    }
                }
                Err(e) => report.errors.push(format!("supplier '{name}': {e}")),
            }
        }
        Ok(report)
    }

    /// Distinct non-empty owners on manual products labeled with `name`.
    fn infer_owners(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT owner FROM manual_products
             WHERE lower(supplier_name) = lower(?1) AND owner <> ''",
        )?;
        let iter = stmt.query_map(params![name], |row| row.get::<_, String>(0))?;
        let mut owners = Vec::new();
        for owner in iter {
            owners.push(owner?);
        }
        Ok(owners)
    }

    // -----------------------------------------------------------------------
    // Legacy mirror
    // -----------------------------------------------------------------------

    /// Rebuild the legacy mirror wholesale: inside one transaction, delete
    /// every mirror row and re-insert one per current link. Any failure
    /// rolls the whole rebuild back; the mirror is never left partial.
    /// Returns rows written.
    pub fn rebuild_legacy_mirror(&mut self) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM legacy_owner_mirror", [])?;

        let pairs: Vec<(String, String)> = {
            let mut stmt = tx.prepare(
                "SELECT s.name, l.owner FROM suppliers s
                 JOIN supplier_owner_links l ON l.supplier_id = s.id",
            )?;
            let iter = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let mut rows = Vec::new();
            for row in iter {
                rows.push(row?);
            }
            rows
        };

        let mut inserted = 0;
        {
            let mut stmt =
                tx.prepare("INSERT INTO legacy_owner_mirror (name, owner) VALUES (?1, ?2)")?;
            for (name, owner) in &pairs {
                stmt.execute(params![name, owner])?;
                inserted += 1;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    /// Current mirror contents, for legacy readers and verification.
    pub fn mirror_rows(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT name, owner FROM legacy_owner_mirror")?;
        let iter = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut rows = Vec::new();
        for row in iter {
            rows.push(row?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewProduct;
    use std::collections::BTreeSet;

    fn product(name: &str, supplier: &str, owner: &str) -> NewProduct {
        NewProduct {
            name: name.into(),
            supplier_name: supplier.into(),
            owner: owner.into(),
            ..NewProduct::default()
        }
    }

    #[test]
    fn add_association_is_idempotent() {
        let catalog = Catalog::open_in_memory().unwrap();
        let id = catalog.ensure_supplier("JELUZ").unwrap();
        catalog.add_association(id, "ferreteria_general").unwrap();
        catalog.add_association(id, "ferreteria_general").unwrap();
        assert_eq!(catalog.owners_for_supplier(id).unwrap().len(), 1);
    }

    #[test]
    fn suppliers_for_owner_sorted_by_name() {
        let catalog = Catalog::open_in_memory().unwrap();
        for name in ["Sica", "JELUZ", "Cambre"] {
            let id = catalog.ensure_supplier(name).unwrap();
            catalog.add_association(id, "ferreteria_general").unwrap();
        }
        let names: Vec<String> = catalog
            .suppliers_for_owner("ferreteria_general")
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Cambre", "JELUZ", "Sica"]);
    }

    #[test]
    fn repair_orphans_removes_dangling_links() {
        let catalog = Catalog::open_in_memory().unwrap();
        let keep = catalog.ensure_supplier("JELUZ").unwrap();
        let gone = catalog.ensure_supplier("ACME").unwrap();
        catalog.add_association(keep, "ferreteria_general").unwrap();
        catalog.add_association(gone, "ferreteria_general").unwrap();
        catalog.delete_supplier(gone).unwrap();

        let report = catalog.repair_orphans().unwrap();
        assert_eq!(report.repaired, 1);
        assert!(report.errors.is_empty());
        assert_eq!(catalog.owners_for_supplier(keep).unwrap().len(), 1);
        assert!(catalog.owners_for_supplier(gone).unwrap().is_empty());
    }

    #[test]
    fn repair_missing_infers_owners_from_products() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog
            .add_product(&product("TERMICA", "JELUZ", "ferreteria_general"))
            .unwrap();
        catalog
            .add_product(&product("LLAVE", "jeluz", "electricidad_sur"))
            .unwrap();

        let report = catalog.repair_missing("fallback").unwrap();
        assert_eq!(report.repaired, 1);
        assert_eq!(report.defaulted, 0);

        let id = catalog.supplier_id("JELUZ").unwrap().unwrap();
        let owners = catalog.owners_for_supplier(id).unwrap();
        let expected: BTreeSet<String> =
            ["ferreteria_general", "electricidad_sur"].iter().map(|s| s.to_string()).collect();
        assert_eq!(owners, expected);
    }

    #[test]
    fn repair_missing_falls_back_to_default_owner() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.ensure_supplier("SIN PRODUCTOS").unwrap();

        let report = catalog.repair_missing("ferreteria_general").unwrap();
        assert_eq!(report.defaulted, 1);
        assert_eq!(report.notices.len(), 1);

        // Post-condition: no supplier is left without an association
        let id = catalog.supplier_id("SIN PRODUCTOS").unwrap().unwrap();
        assert!(!catalog.owners_for_supplier(id).unwrap().is_empty());
    }

    #[test]
    fn repair_missing_ignores_blank_product_owners() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.add_product(&product("ALGO", "ACME", "")).unwrap();

        let report = catalog.repair_missing("fallback").unwrap();
        assert_eq!(report.repaired, 0);
        assert_eq!(report.defaulted, 1);

        let id = catalog.supplier_id("ACME").unwrap().unwrap();
        assert_eq!(
            catalog.owners_for_supplier(id).unwrap(),
            BTreeSet::from(["fallback".to_string()])
        );
    }

    #[test]
    fn mirror_equals_association_projection() {
        let mut catalog = Catalog::open_in_memory().unwrap();
        let jeluz = catalog.ensure_supplier("JELUZ").unwrap();
        let sica = catalog.ensure_supplier("Sica").unwrap();
        catalog.add_association(jeluz, "ferreteria_general").unwrap();
        catalog.add_association(jeluz, "electricidad_sur").unwrap();
        catalog.add_association(sica, "electricidad_sur").unwrap();

        let written = catalog.rebuild_legacy_mirror().unwrap();
        assert_eq!(written, 3);

        let mirror: BTreeSet<(String, String)> =
            catalog.mirror_rows().unwrap().into_iter().collect();
        let expected: BTreeSet<(String, String)> = [
            ("JELUZ", "ferreteria_general"),
            ("JELUZ", "electricidad_sur"),
            ("Sica", "electricidad_sur"),
        ]
        .iter()
        .map(|(n, o)| (n.to_string(), o.to_string()))
        .collect();
        assert_eq!(mirror, expected);
    }

    #[test]
    fn rebuild_replaces_stale_mirror_rows() {
        let mut catalog = Catalog::open_in_memory().unwrap();
        let id = catalog.ensure_supplier("JELUZ").unwrap();
        catalog.add_association(id, "ferreteria_general").unwrap();
        catalog.rebuild_legacy_mirror().unwrap();

        // Associations change; the mirror is rebuilt wholesale, never patched
        catalog.add_association(id, "electricidad_sur").unwrap();
        catalog.rebuild_legacy_mirror().unwrap();

        assert_eq!(catalog.mirror_rows().unwrap().len(), 2);
    }
}
