//! MenuLens - menu photo digitizer
//!
//! Photographed menu in, structured price list out: Azure Document
//! Intelligence for OCR, heuristic layout parsing into items that can be
//! reviewed, exported as JSON, or imported into the local menu store.

mod config;
mod ocr;
mod parser;
mod storage;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::ocr::{AzureLayoutClient, AzureOptions, DocumentAnalyzer};
use crate::parser::MenuScanResult;
use crate::storage::{MenuStore, NewMenuItem};

/// MenuLens - turn a menu photo into a structured price list
#[derive(Parser, Debug)]
#[command(name = "menulens")]
#[command(about = "Turn a menu photo into a structured price list")]
struct Args {
    /// Path to the configuration file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a menu photo and print the detected items
    Scan {
        /// Path to the menu image
        image: PathBuf,

        /// Write the scan result as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Import the detected items into the menu store
        #[arg(long)]
        import: bool,

        /// Print the raw OCR text after the item table
        #[arg(long)]
        raw_text: bool,

        /// Only import items at or above this confidence (overrides config)
        #[arg(long)]
        min_confidence: Option<f32>,
    },
    /// Manage stored menu items
    Items {
        #[command(subcommand)]
        command: ItemsCommand,
    },
    /// Write a default config.toml to the user config directory
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ItemsCommand {
    /// List stored menu items
    List,
    /// Add a single menu item
    Add {
        name: String,
        price: f64,

        /// Unit the price applies to (defaults from config)
        #[arg(long)]
        unit: Option<String>,

        /// Image URL (defaults to the configured placeholder)
        #[arg(long)]
        image: Option<String>,
    },
    /// Delete a menu item by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // Load or create configuration
    let config = load_or_create_config(args.config.as_deref());

    match args.command {
        Command::Scan {
            image,
            json,
            import,
            raw_text,
            min_confidence,
        } => run_scan(&config, &image, json.as_deref(), import, raw_text, min_confidence).await,
        Command::Items { command } => run_items(&config, command),
        Command::InitConfig { force } => init_config(force),
    }
}

/// Write the default configuration for the user to fill in.
fn init_config(force: bool) -> Result<()> {
    let path = storage::get_config_dir()?.join("config.toml");
    if path.exists() && !force {
        anyhow::bail!("{:?} already exists, pass --force to overwrite", path);
    }
    config::save_config(&AppConfig::default(), &path)?;
    println!("Wrote default configuration to {:?}", path);
    println!(
        "Set ocr.endpoint there, and the API key via {} or ocr.api_key.",
        config::API_KEY_ENV
    );
    Ok(())
}

/// Load configuration from file or create default
fn load_or_create_config(path: Option<&Path>) -> AppConfig {
    if let Some(path) = path {
        match config::load_config(path) {
            Ok(config) => return config,
            Err(e) => {
                warn!("Failed to load config from {:?}: {}", path, e);
                return AppConfig::default();
            }
        }
    }

    if let Ok(config_dir) = storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Full scan pipeline: read, preprocess, analyze, parse, report.
async fn run_scan(
    config: &AppConfig,
    image_path: &Path,
    json_path: Option<&Path>,
    import: bool,
    raw_text: bool,
    min_confidence: Option<f32>,
) -> Result<()> {
    let endpoint = config.ocr.resolved_endpoint().ok_or_else(|| {
        anyhow!(
            "Azure endpoint not configured. Set {} or add it to config.toml",
            config::ENDPOINT_ENV
        )
    })?;
    let api_key = config.ocr.resolved_api_key().ok_or_else(|| {
        anyhow!(
            "Azure API key not configured. Set {} or add it to config.toml",
            config::API_KEY_ENV
        )
    })?;

    let bytes = std::fs::read(image_path)
        .with_context(|| format!("Failed to read image {:?}", image_path))?;
    let prepared = ocr::prepare_for_upload(&bytes, &config.preprocess)?;

    let client = AzureLayoutClient::new(
        endpoint,
        api_key,
        AzureOptions {
            model_id: config.ocr.model_id.clone(),
            api_version: config.ocr.api_version.clone(),
            poll_interval: Duration::from_millis(config.ocr.poll_interval_ms),
            timeout: Duration::from_secs(config.ocr.timeout_secs),
        },
    );

    info!("Analyzing menu photo {:?}", image_path);
    let document = client
        .analyze(&prepared)
        .await
        .context("Menu analysis failed, check configuration or try again")?;

    let result = parser::parse_menu_document(&document);

    if result.items.is_empty() {
        println!(
            "No menu items detected. Try another photo or add items manually with `menulens items add`."
        );
    } else {
        print_items(&result);
        for (i, j) in parser::suspected_duplicates(&result.items) {
            warn!(
                "Possible duplicate detections at {}: {:?} / {:?}",
                result.items[i].price, result.items[i].name, result.items[j].name
            );
        }
    }

    if raw_text {
        println!("\n--- raw text ---\n{}", result.raw_text);
    }

    if let Some(path) = json_path {
        std::fs::write(path, serde_json::to_string_pretty(&result)?)
            .with_context(|| format!("Failed to write {:?}", path))?;
        info!("Wrote scan result to {:?}", path);
    }

    if import && !result.items.is_empty() {
        import_items(config, &result, min_confidence)?;
    }

    Ok(())
}

/// Print the detected items as a table.
fn print_items(result: &MenuScanResult) {
    println!(
        "Detected {} menu items across {} page(s):",
        result.items.len(),
        result.page_count
    );
    for item in &result.items {
        println!(
            "  [{:>3.0}%] {:<18} {:<40} {:>9.2}",
            item.confidence * 100.0,
            item.category,
            item.name,
            item.price
        );
    }
}

/// Import parsed items into the store, applying the configured defaults
/// and skipping anything below the confidence floor.
fn import_items(
    config: &AppConfig,
    result: &MenuScanResult,
    min_confidence: Option<f32>,
) -> Result<()> {
    let floor = min_confidence.unwrap_or(config.import.min_confidence);

    let accepted: Vec<NewMenuItem> = result
        .items
        .iter()
        .filter(|item| item.confidence >= floor)
        .map(|item| NewMenuItem {
            name: item.name.clone(),
            price: item.price,
            unit: config.import.default_unit.clone(),
            image_uri: config.import.placeholder_image.clone(),
        })
        .collect();

    let skipped = result.items.len() - accepted.len();
    if skipped > 0 {
        info!("Skipping {} item(s) below confidence {:.2}", skipped, floor);
    }

    let mut store = open_store()?;
    let added = store.add_items(accepted)?;
    println!("Imported {} item(s) into the menu store.", added.len());
    Ok(())
}

/// Store operations for the `items` subcommands.
fn run_items(config: &AppConfig, command: ItemsCommand) -> Result<()> {
    let store = open_store()?;

    match command {
        ItemsCommand::List => {
            let items = store.list_items()?;
            if items.is_empty() {
                println!("No stored menu items.");
            }
            for item in items {
                println!(
                    "{}  {:<40} {:>9.2} / {}",
                    item.id, item.name, item.price, item.unit
                );
            }
        }
        ItemsCommand::Add {
            name,
            price,
            unit,
            image,
        } => {
            anyhow::ensure!(
                price > 0.0 && price < parser::MAX_PRICE,
                "price must be between 0 and {}",
                parser::MAX_PRICE
            );
            let item = store.add_item(NewMenuItem {
                name,
                price,
                unit: unit.unwrap_or_else(|| config.import.default_unit.clone()),
                image_uri: image.unwrap_or_else(|| config.import.placeholder_image.clone()),
            })?;
            println!("Added {} ({})", item.name, item.id);
        }
        ItemsCommand::Delete { id } => {
            if store.delete_item(&id)? {
                println!("Deleted {id}");
            } else {
                println!("No item with id {id}");
            }
        }
    }
    Ok(())
}

/// Open the menu store in the application data directory.
fn open_store() -> Result<MenuStore> {
    let data_dir = storage::get_data_dir()?;
    MenuStore::open(&data_dir.join("menu.db"))
}
