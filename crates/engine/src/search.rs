use tracing::debug;

use crate::error::EngineError;
use crate::ingest;
use crate::model::{
    ManualProduct, PriceListEntry, Provenance, SearchMeta, SearchQuery, SearchRecord, SearchResult,
    SheetSet,
};
use crate::price;
use crate::registry::SupplierRegistry;
use crate::resolve;

// ---------------------------------------------------------------------------
// Persistence seam
// ---------------------------------------------------------------------------

/// Read access to manually entered products. The SQLite catalog implements
/// this; engine tests use an in-memory vector.
pub trait ProductLookup {
    /// Products whose supplier label equals `name` case-insensitively,
    /// optionally restricted to an owner (case-insensitive equality).
    fn by_supplier_name(
        &self,
        name: &str,
        owner: Option<&str>,
    ) -> Result<Vec<ManualProduct>, EngineError>;

    /// Products restricted only by owner; `None` returns everything.
    fn by_owner(&self, owner: Option<&str>) -> Result<Vec<ManualProduct>, EngineError>;
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Run one search: resolve the supplier filter, merge sheet entries with
/// manual products, token-filter, normalize prices. Stateless per call.
pub fn search(
    query: &SearchQuery,
    registry: &SupplierRegistry,
    sheets: &SheetSet,
    products: &dyn ProductLookup,
) -> Result<SearchResult, EngineError> {
    let tokens = tokenize(&query.text);
    let owner = query.owner.as_deref();

    let supplied = query.supplier.as_deref().filter(|s| !s.trim().is_empty());
    let resolved = supplied.and_then(|key| resolve::resolve(registry, key));
    let filter_dropped = supplied.is_some() && resolved.is_none();
    if filter_dropped {
        debug!(
            filter = supplied.unwrap_or_default(),
            "supplier filter not in registry; searching without it"
        );
    }

    let mut broadened = false;
    let filtered = resolved.and_then(|key| registry.suppliers.get(key).map(|c| (key, c)));
    let records = match filtered {
        Some((key, config)) => {
            let sheet_entries = sheets
                .rows_for(key)
                .map(|rows| ingest::ingest(rows, config))
                .unwrap_or_default();
            let manual = products.by_supplier_name(&config.name, owner)?;

            let mut combined: Vec<SearchRecord> = sheet_entries
                .into_iter()
                .map(sheet_record)
                .chain(manual.into_iter().map(manual_record))
                .filter(|r| matches_tokens(r, &tokens))
                .collect();

            if combined.is_empty() {
                // A supplier filter narrows results; it must not hide a
                // product recorded under a slightly different label.
                broadened = true;
                combined = products
                    .by_owner(owner)?
                    .into_iter()
                    .map(manual_record)
                    .filter(|r| matches_tokens(r, &tokens))
                    .collect();
            }
            combined
        }
        None => products
            .by_owner(owner)?
            .into_iter()
            .map(manual_record)
            .filter(|r| matches_tokens(r, &tokens))
            .collect(),
    };

    Ok(SearchResult {
        meta: SearchMeta {
            query: query.text.clone(),
            supplier_filter: supplied.map(str::to_string),
            resolved_supplier: resolved.map(str::to_string),
            filter_dropped,
            broadened,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        records,
    })
}

// ---------------------------------------------------------------------------
// Record conversion
// ---------------------------------------------------------------------------

fn sheet_record(entry: PriceListEntry) -> SearchRecord {
    SearchRecord {
        code: entry.code,
        name: entry.name,
        price: entry.price,
        raw_price: entry.raw_price,
        supplier_name: entry.supplier_name,
        observations: String::new(),
        owner: entry.owner,
        provenance: Provenance::Sheet,
    }
}

fn manual_record(product: ManualProduct) -> SearchRecord {
    let parsed = price::parse_text(&product.price);
    let raw_price = parsed.error.as_ref().map(|_| product.price.clone());
    SearchRecord {
        code: product.code,
        name: product.name,
        price: parsed.value,
        raw_price,
        supplier_name: product.supplier_name,
        observations: product.observations,
        owner: product.owner,
        provenance: Provenance::Manual,
    }
}

// ---------------------------------------------------------------------------
// Token filter
// ---------------------------------------------------------------------------

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Conjunctive per-token filter: every token must appear case-insensitively
/// in at least one of name, code, supplier name.
fn matches_tokens(record: &SearchRecord, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let name = record.name.to_lowercase();
    let code = record.code.to_lowercase();
    let supplier = record.supplier_name.to_lowercase();
    tokens
        .iter()
        .all(|t| name.contains(t) || code.contains(t) || supplier.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, name: &str, supplier: &str) -> SearchRecord {
        SearchRecord {
            code: code.into(),
            name: name.into(),
            price: 0.0,
            raw_price: None,
            supplier_name: supplier.into(),
            observations: String::new(),
            owner: "ferreteria_general".into(),
            provenance: Provenance::Manual,
        }
    }

    #[test]
    fn every_token_must_match_somewhere() {
        let r = record("TERM32A", "TERMICA 32A", "JELUZ");
        assert!(matches_tokens(&r, &tokenize("termica jeluz")));
        assert!(matches_tokens(&r, &tokenize("TERM32A")));
        assert!(!matches_tokens(&r, &tokenize("termica sica")));
    }

    #[test]
    fn empty_query_keeps_everything() {
        let r = record("", "CABLE 2.5MM", "");
        assert!(matches_tokens(&r, &tokenize("")));
        assert!(matches_tokens(&r, &tokenize("   ")));
    }

    #[test]
    fn tokens_match_across_fields() {
        // One token hits the code, the other the supplier
        let r = record("T32", "TERMICA", "JELUZ");
        assert!(matches_tokens(&r, &tokenize("t32 jeluz")));
    }

    #[test]
    fn manual_record_preserves_unparseable_price() {
        let product = ManualProduct {
            id: 7,
            code: "X".into(),
            name: "ALGO".into(),
            price: "consultar".into(),
            supplier_name: "JELUZ".into(),
            owner: "ferreteria_general".into(),
            observations: String::new(),
        };
        let r = manual_record(product);
        assert_eq!(r.price, 0.0);
        assert_eq!(r.raw_price.as_deref(), Some("consultar"));
        assert_eq!(r.provenance, Provenance::Manual);
    }
}
