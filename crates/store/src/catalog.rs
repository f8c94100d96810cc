// Catalog storage using SQLite

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use almacen_engine::error::EngineError;
use almacen_engine::model::ManualProduct;
use almacen_engine::registry::SupplierRegistry;
use almacen_engine::search::ProductLookup;

use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS suppliers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    legacy_owner TEXT             -- deprecated, superseded by supplier_owner_links
);

CREATE TABLE IF NOT EXISTS supplier_owner_links (
    supplier_id INTEGER NOT NULL,
    owner TEXT NOT NULL,
    UNIQUE (supplier_id, owner)
);

CREATE TABLE IF NOT EXISTS legacy_owner_mirror (
    name TEXT NOT NULL,
    owner TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS manual_products (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    price TEXT NOT NULL DEFAULT '',
    supplier_name TEXT NOT NULL DEFAULT '',
    owner TEXT NOT NULL DEFAULT '',
    observations TEXT NOT NULL DEFAULT ''
);
"#;

/// Insert payload for a manual product. Rows are never updated in place:
/// replacement is delete + re-add.
#[derive(Debug, Default, Clone)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub price: String,
    pub supplier_name: String,
    pub owner: String,
    pub observations: String,
}

/// Open handle over the catalog database. One handle per logical caller;
/// every multi-row write goes through an explicit transaction.
pub struct Catalog {
    pub(crate) conn: Connection,
}

impl Catalog {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    // -----------------------------------------------------------------------
    // Suppliers
    // -----------------------------------------------------------------------

    pub fn supplier_id(&self, name: &str) -> Result<Option<i64>, StoreError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM suppliers WHERE lower(name) = lower(?1)",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Supplier row id for `name`, creating the row on first reference.
    /// Matching is case-insensitive; the first spelling seen is preserved.
    pub fn ensure_supplier(&self, name: &str) -> Result<i64, StoreError> {
        if let Some(id) = self.supplier_id(name)? {
            return Ok(id);
        }
        self.conn
            .execute("INSERT INTO suppliers (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_supplier(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self
            .conn
            .execute("DELETE FROM suppliers WHERE id = ?1", params![id])?
            > 0)
    }

    /// Create a supplier row per registry entry not yet present. Returns the
    /// number of rows created.
    pub fn seed_suppliers(&self, registry: &SupplierRegistry) -> Result<usize, StoreError> {
        let mut created = 0;
        for config in registry.suppliers.values() {
            if self.supplier_id(&config.name)?.is_none() {
                self.conn.execute(
                    "INSERT INTO suppliers (name) VALUES (?1)",
                    params![config.name],
                )?;
                created += 1;
            }
        }
        Ok(created)
    }

    // -----------------------------------------------------------------------
    // Manual products
    // -----------------------------------------------------------------------

    pub fn add_product(&self, product: &NewProduct) -> Result<i64, StoreError> {
        // First manual reference creates the supplier row
        if !product.supplier_name.trim().is_empty() {
            self.ensure_supplier(product.supplier_name.trim())?;
        }
        self.conn.execute(
            "INSERT INTO manual_products (code, name, price, supplier_name, owner, observations)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                product.code,
                product.name,
                product.price,
                product.supplier_name,
                product.owner,
                product.observations
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_product(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self
            .conn
            .execute("DELETE FROM manual_products WHERE id = ?1", params![id])?
            > 0)
    }

    /// Bulk delete; ids not present are skipped. Returns rows removed.
    pub fn delete_products(&self, ids: &[i64]) -> Result<usize, StoreError> {
        let mut removed = 0;
        for id in ids {
            if self.delete_product(*id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn products_by_supplier_name(
        &self,
        name: &str,
        owner: Option<&str>,
    ) -> Result<Vec<ManualProduct>, StoreError> {
        match owner {
            Some(owner) => self.select_products(
                "SELECT id, code, name, price, supplier_name, owner, observations
                 FROM manual_products
                 WHERE lower(supplier_name) = lower(?1) AND lower(owner) = lower(?2)
                 ORDER BY id",
                params![name, owner],
            ),
            None => self.select_products(
                "SELECT id, code, name, price, supplier_name, owner, observations
                 FROM manual_products
                 WHERE lower(supplier_name) = lower(?1)
                 ORDER BY id",
                params![name],
            ),
        }
    }

    pub fn products_by_owner(&self, owner: Option<&str>) -> Result<Vec<ManualProduct>, StoreError> {
        match owner {
            Some(owner) => self.select_products(
                "SELECT id, code, name, price, supplier_name, owner, observations
                 FROM manual_products
                 WHERE lower(owner) = lower(?1)
                 ORDER BY id",
                params![owner],
            ),
            None => self.all_products(),
        }
    }

    pub fn all_products(&self) -> Result<Vec<ManualProduct>, StoreError> {
        self.select_products(
            "SELECT id, code, name, price, supplier_name, owner, observations
             FROM manual_products ORDER BY id",
            params![],
        )
    }

    fn select_products(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<ManualProduct>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let iter = stmt.query_map(params, |row| {
            Ok(ManualProduct {
                id: row.get(0)?,
                code: row.get(1)?,
                name: row.get(2)?,
                price: row.get(3)?,
                supplier_name: row.get(4)?,
                owner: row.get(5)?,
                observations: row.get(6)?,
            })
        })?;
        let mut products = Vec::new();
        for product in iter {
            products.push(product?);
        }
        Ok(products)
    }
}

impl ProductLookup for Catalog {
    fn by_supplier_name(
        &self,
        name: &str,
        owner: Option<&str>,
    ) -> Result<Vec<ManualProduct>, EngineError> {
        self.products_by_supplier_name(name, owner)
            .map_err(|e| EngineError::Lookup(e.to_string()))
    }

    fn by_owner(&self, owner: Option<&str>) -> Result<Vec<ManualProduct>, EngineError> {
        self.products_by_owner(owner)
            .map_err(|e| EngineError::Lookup(e.to_string()))
    }
}
