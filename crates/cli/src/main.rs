// almacen CLI - headless catalog search and maintenance

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use almacen_engine::model::{SearchQuery, SheetSet};
use almacen_engine::registry::SupplierRegistry;
use almacen_engine::search;
use almacen_store::{Catalog, NewProduct};

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "almacen")]
#[command(about = "Multi-owner product catalog (CLI mode, headless)")]
#[command(version)]
struct Cli {
    /// SQLite catalog database
    #[arg(long, global = true, default_value = "almacen.db", env = "ALMACEN_DB")]
    db: PathBuf,

    /// Supplier registry (TOML)
    #[arg(long, global = true, default_value = "suppliers.toml", env = "ALMACEN_CONFIG")]
    config: PathBuf,

    /// Directory holding supplier price-list files
    #[arg(long, global = true, default_value = "listas", env = "ALMACEN_SHEETS")]
    sheets: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search products across price lists and the manual catalog
    #[command(after_help = "\
Examples:
  almacen search termica --supplier jeluz --owner ferreteria_general
  almacen search \"cable 2.5\" --json")]
    Search {
        /// Free-text query; every token must match
        #[arg(default_value = "")]
        query: String,

        /// Restrict to one supplier (case-insensitive)
        #[arg(long)]
        supplier: Option<String>,

        /// Restrict to one owner
        #[arg(long)]
        owner: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a manual product
    Add {
        #[arg(long, default_value = "")]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long, default_value = "")]
        supplier: String,
        #[arg(long, default_value = "")]
        owner: String,
        #[arg(long, default_value = "")]
        observations: String,
    },

    /// Remove manual products by id
    Rm {
        ids: Vec<i64>,
    },

    /// List suppliers associated with an owner
    Suppliers {
        #[arg(long)]
        owner: String,
    },

    /// Create supplier rows for registry entries
    Seed,

    /// Referential repairs on supplier-owner links
    Repair {
        #[command(subcommand)]
        what: RepairCommands,
    },

    /// Legacy mirror maintenance
    Mirror {
        #[command(subcommand)]
        what: MirrorCommands,
    },
}

#[derive(Subcommand)]
enum RepairCommands {
    /// Drop links pointing at deleted suppliers
    Orphans,
    /// Link every linkless supplier to an inferred or default owner
    Missing,
}

#[derive(Subcommand)]
enum MirrorCommands {
    /// Rebuild the legacy mirror from current links (all-or-nothing)
    Rebuild,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Rm { ids } = &cli.command {
        if ids.is_empty() {
            eprintln!("error: rm requires at least one product id");
            return ExitCode::from(EXIT_USAGE);
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    match &cli.command {
        Commands::Search {
            query,
            supplier,
            owner,
            json,
        } => cmd_search(cli, query, supplier.as_deref(), owner.as_deref(), *json),
        Commands::Add {
            code,
            name,
            price,
            supplier,
            owner,
            observations,
        } => cmd_add(cli, code, name, price, supplier, owner, observations),
        Commands::Rm { ids } => cmd_rm(cli, ids),
        Commands::Suppliers { owner } => cmd_suppliers(cli, owner),
        Commands::Seed => cmd_seed(cli),
        Commands::Repair { what } => match what {
            RepairCommands::Orphans => cmd_repair_orphans(cli),
            RepairCommands::Missing => cmd_repair_missing(cli),
        },
        Commands::Mirror { what } => match what {
            MirrorCommands::Rebuild => cmd_mirror_rebuild(cli),
        },
    }
}

fn open_catalog(cli: &Cli) -> Result<Catalog, String> {
    Catalog::open(&cli.db).map_err(|e| e.to_string())
}

fn load_registry(cli: &Cli) -> Result<SupplierRegistry, String> {
    almacen_io::load_registry(&cli.config)
}

fn cmd_search(
    cli: &Cli,
    text: &str,
    supplier: Option<&str>,
    owner: Option<&str>,
    json: bool,
) -> Result<(), String> {
    let registry = load_registry(cli)?;
    let sheets = if cli.sheets.is_dir() {
        almacen_io::load_sheet_set(&cli.sheets, &registry)?
    } else {
        SheetSet::default()
    };
    let catalog = open_catalog(cli)?;

    let query = SearchQuery {
        text: text.to_string(),
        supplier: supplier.map(str::to_string),
        owner: owner.map(str::to_string),
    };
    let result =
        search::search(&query, &registry, &sheets, &catalog).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    if result.meta.filter_dropped {
        eprintln!("note: supplier filter not found; searching all suppliers");
    }
    if result.meta.broadened {
        eprintln!("note: nothing under that supplier; showing matches from all suppliers");
    }
    for r in &result.records {
        let price = match &r.raw_price {
            Some(raw) => format!("?({raw})"),
            None => format!("{:.2}", r.price),
        };
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            r.code, r.name, price, r.supplier_name, r.owner, r.provenance
        );
    }
    eprintln!("{} result(s)", result.records.len());
    Ok(())
}

fn cmd_add(
    cli: &Cli,
    code: &str,
    name: &str,
    price: &str,
    supplier: &str,
    owner: &str,
    observations: &str,
) -> Result<(), String> {
    let catalog = open_catalog(cli)?;
    let id = catalog
        .add_product(&NewProduct {
            code: code.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            supplier_name: supplier.to_string(),
            owner: owner.to_string(),
            observations: observations.to_string(),
        })
        .map_err(|e| e.to_string())?;
    println!("{id}");
    Ok(())
}

fn cmd_rm(cli: &Cli, ids: &[i64]) -> Result<(), String> {
    let catalog = open_catalog(cli)?;
    let removed = catalog.delete_products(ids).map_err(|e| e.to_string())?;
    println!("{removed} product(s) removed");
    Ok(())
}

fn cmd_suppliers(cli: &Cli, owner: &str) -> Result<(), String> {
    let catalog = open_catalog(cli)?;
    let suppliers = catalog
        .suppliers_for_owner(owner)
        .map_err(|e| e.to_string())?;
    for s in &suppliers {
        println!("{}\t{}", s.id, s.name);
    }
    eprintln!("{} supplier(s)", suppliers.len());
    Ok(())
}

fn cmd_seed(cli: &Cli) -> Result<(), String> {
    let registry = load_registry(cli)?;
    let catalog = open_catalog(cli)?;
    let created = catalog
        .seed_suppliers(&registry)
        .map_err(|e| e.to_string())?;
    println!("{created} supplier(s) created");
    Ok(())
}

fn cmd_repair_orphans(cli: &Cli) -> Result<(), String> {
    let catalog = open_catalog(cli)?;
    let report = catalog.repair_orphans().map_err(|e| e.to_string())?;
    let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}

fn cmd_repair_missing(cli: &Cli) -> Result<(), String> {
    let registry = load_registry(cli)?;
    let catalog = open_catalog(cli)?;
    let report = catalog
        .repair_missing(&registry.default_owner)
        .map_err(|e| e.to_string())?;
    let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}

fn cmd_mirror_rebuild(cli: &Cli) -> Result<(), String> {
    let mut catalog = open_catalog(cli)?;
    let written = catalog
        .rebuild_legacy_mirror()
        .map_err(|e| e.to_string())?;
    println!("{written} mirror row(s) written");
    Ok(())
}
