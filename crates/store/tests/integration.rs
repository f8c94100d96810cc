//! Search wired through the real SQLite catalog.

use almacen_engine::model::{Cell, Provenance, SearchQuery, SheetSet};
use almacen_engine::registry::SupplierRegistry;
use almacen_engine::search::search;
use almacen_store::{Catalog, NewProduct};

const REGISTRY: &str = r#"
default_owner = "ferreteria_general"

[suppliers.jeluz]
name = "JELUZ"
owner = "ferreteria_general"
header_row = 0

[suppliers.jeluz.columns]
code  = ["codigo"]
name  = ["descripcion"]
price = ["precio"]
"#;

fn seeded_catalog() -> Catalog {
    let catalog = Catalog::open_in_memory().unwrap();
    catalog
        .add_product(&NewProduct {
            code: "TERM32A".into(),
            name: "TERMICA 32A JELUZ".into(),
            price: "5000".into(),
            supplier_name: "JELUZ".into(),
            owner: "ferreteria_general".into(),
            observations: String::new(),
        })
        .unwrap();
    catalog
}

fn query(text: &str, supplier: Option<&str>, owner: Option<&str>) -> SearchQuery {
    SearchQuery {
        text: text.into(),
        supplier: supplier.map(str::to_string),
        owner: owner.map(str::to_string),
    }
}

#[test]
fn manual_product_found_through_sqlite() {
    let registry = SupplierRegistry::from_toml(REGISTRY).unwrap();
    let catalog = seeded_catalog();

    let result = search(
        &query("TERM32A", Some("jeluz"), Some("ferreteria_general")),
        &registry,
        &SheetSet::default(),
        &catalog,
    )
    .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].price, 5000.0);
    assert_eq!(result.records[0].provenance, Provenance::Manual);
}

#[test]
fn sheet_and_manual_rows_merge() {
    let registry = SupplierRegistry::from_toml(REGISTRY).unwrap();
    let catalog = seeded_catalog();

    let mut sheets = SheetSet::default();
    sheets.insert(
        "jeluz",
        vec![
            vec![
                Cell::Text("codigo".into()),
                Cell::Text("descripcion".into()),
                Cell::Text("precio".into()),
            ],
            vec![
                Cell::Text("TERM32B".into()),
                Cell::Text("TERMICA 32A BIPOLAR".into()),
                Cell::Text("1.234,56".into()),
            ],
        ],
    );

    let result = search(&query("termica", Some("jeluz"), None), &registry, &sheets, &catalog).unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].provenance, Provenance::Sheet);
    assert_eq!(result.records[0].price, 1234.56);
    assert_eq!(result.records[1].provenance, Provenance::Manual);
}

#[test]
fn broadening_reaches_mislabeled_products() {
    let registry = SupplierRegistry::from_toml(REGISTRY).unwrap();
    let catalog = seeded_catalog();
    catalog
        .add_product(&NewProduct {
            code: "CAB25".into(),
            name: "CABLE 2.5MM".into(),
            price: "900".into(),
            supplier_name: "Jeluz S.A.".into(), // label drifted from config
            owner: "ferreteria_general".into(),
            observations: String::new(),
        })
        .unwrap();

    let result = search(
        &query("cable", Some("jeluz"), Some("ferreteria_general")),
        &registry,
        &SheetSet::default(),
        &catalog,
    )
    .unwrap();

    assert!(result.meta.broadened);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].code, "CAB25");
}
