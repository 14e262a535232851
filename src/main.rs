use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;

use storefront_query::config::AppConfig;
use storefront_query::core::logging::{self, AppError};
use storefront_query::core::query::RuleBasedNormalizer;
use storefront_query::core::search::{
    InMemorySearchBackend, ProductRecord, ProductSearchService, SearchError,
};

/// Storefront query parser and product search
#[derive(Parser)]
#[command(name = "storefront-query", version)]
#[command(about = "Parse shopping queries and search a product catalog")]
struct Cli {
    /// Configuration file (defaults to ~/.config/storefront-query/config.toml)
    #[arg(short, long, global = true, env = "STOREFRONT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query into structured filters
    Parse {
        query: String,
        /// Product catalog (JSON array) whose terms join the vocabulary
        #[arg(long, default_value = "data/sample_catalog.json")]
        catalog: PathBuf,
    },
    /// Parse a query and search the catalog
    Search {
        query: String,
        /// Product catalog (JSON array)
        #[arg(long, default_value = "data/sample_catalog.json")]
        catalog: PathBuf,
    },
    /// Normalize a product, grow the vocabulary and add it to the catalog
    AddProduct {
        /// Product as a JSON object
        product: String,
        /// Product catalog (JSON array); rewritten with the new product
        #[arg(long, default_value = "data/sample_catalog.json")]
        catalog: PathBuf,
    },
    /// Print the vocabulary lists
    Vocab {
        /// Include terms registered from this catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Read the file before logging starts, report it once the subscriber is up
    let config_path = AppConfig::resolve_path(cli.config.as_deref()).into_diagnostic()?;
    let config = AppConfig::from_path(&config_path).into_diagnostic()?;
    let _log_guard = logging::init(&config.logging);
    log::info!("{} v{} starting", storefront_query::NAME, storefront_query::VERSION);
    AppConfig::log_source(&config_path);

    match cli.command {
        Commands::Parse { query, catalog } => {
            let backend = load_catalog(&catalog)?;
            let service = build_service(&config, backend.clone())?;
            service.register_catalog(&backend.products().await);
            let parsed = service.parse(&query).map_err(report)?;
            print_json(&parsed)
        }
        Commands::Search { query, catalog } => {
            let backend = load_catalog(&catalog)?;
            let service = build_service(&config, backend.clone())?;
            service.register_catalog(&backend.products().await);
            let results = service.search(&query).await.map_err(report)?;
            print_json(&results)
        }
        Commands::AddProduct { product, catalog } => {
            let product: ProductRecord = serde_json::from_str(&product)
                .into_diagnostic()
                .wrap_err("Product must be a JSON object")?;

            let backend = load_catalog(&catalog)?;
            let service = build_service(&config, backend.clone())?;
            service.register_catalog(&backend.products().await);

            let outcome = service.add_product(product).await.map_err(report)?;
            save_catalog(&catalog, &backend.products().await)?;
            print_json(&outcome)
        }
        Commands::Vocab { catalog } => {
            let backend = match catalog {
                Some(catalog) => load_catalog(&catalog)?,
                None => Arc::new(InMemorySearchBackend::new()),
            };
            let service = build_service(&config, backend.clone())?;
            service.register_catalog(&backend.products().await);
            print_json(&service.vocabulary())
        }
    }
}

fn build_service(
    config: &AppConfig,
    backend: Arc<InMemorySearchBackend>,
) -> Result<ProductSearchService> {
    ProductSearchService::from_config(config, Arc::new(RuleBasedNormalizer::new()), backend)
        .map_err(report)
}

fn load_catalog(path: &Path) -> Result<Arc<InMemorySearchBackend>> {
    if !path.exists() {
        log::warn!("Catalog {} not found, starting empty", path.display());
        return Ok(Arc::new(InMemorySearchBackend::new()));
    }
    let backend = InMemorySearchBackend::from_json_file(path).map_err(report)?;
    Ok(Arc::new(backend))
}

fn save_catalog(path: &Path, products: &[ProductRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(products).into_diagnostic()?;
    std::fs::write(path, json)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write catalog {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

fn report(e: SearchError) -> miette::Report {
    let help = match &e {
        SearchError::EmptyQuery => Some("Pass a non-empty query, e.g. \"red sneakers under 1500\""),
        SearchError::InvalidProduct(_) => Some("Products need a name and a non-negative price"),
        SearchError::Timeout(_) => Some("Raise search.request_timeout_ms in the config file"),
        _ => None,
    };
    let error = AppError::new(e.to_string());
    match help {
        Some(help) => error.with_help(help).into(),
        None => error.into(),
    }
}
