//! `almacen-engine` — Multi-source product search engine.
//!
//! Pure engine crate: receives pre-loaded sheet rows, an immutable supplier
//! registry, and a product-lookup handle; returns merged, normalized search
//! results. No file or database dependencies.

pub mod error;
pub mod ingest;
pub mod model;
pub mod price;
pub mod registry;
pub mod resolve;
pub mod search;

pub use error::EngineError;
pub use model::{
    Cell, ManualProduct, PriceListEntry, Provenance, SearchQuery, SearchRecord, SearchResult,
    SheetSet,
};
pub use registry::{SupplierConfig, SupplierRegistry};
pub use search::{search, ProductLookup};
