//! `almacen-store` — SQLite persistence for the product catalog.
//!
//! Owns the suppliers, supplier-owner links, legacy mirror, and manual
//! product tables, plus the repair and mirror-rebuild maintenance sweeps.

pub mod assoc;
pub mod catalog;
pub mod error;

pub use assoc::{RepairReport, SupplierRef};
pub use catalog::{Catalog, NewProduct};
pub use error::StoreError;
