use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use menuform_core::CustomerDetails;
use menuform_ocr::OcrBackend;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use commands::{AppState, OrderRequest, PublishRequest};
use config::AppConfig;

/// Turn photographed daily menus into orderable menus.
#[derive(Parser)]
#[command(name = "menuform")]
#[command(version)]
#[command(about = "Photograph a menu, publish it, take orders")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "menuform.toml")]
    config: PathBuf,

    /// Directory holding menuform.db (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize a menu photo and print the table and date as JSON
    Extract {
        image: PathBuf,
    },
    /// Store a menu from a photo and/or typed rows as an orderable menu
    Publish {
        image: Option<PathBuf>,
        /// NAME=PRICE row added after the recognized ones, repeatable
        #[arg(long = "item")]
        items: Vec<String>,
        /// Override the recognized menu date (DD/MM/YYYY)
        #[arg(long)]
        date: Option<String>,
    },
    /// Replace the rows of a published menu
    Edit {
        menu_id: String,
        /// NAME=PRICE, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },
    /// Print a published menu
    Show {
        menu_id: String,
    },
    /// Place an order against a published menu
    Order {
        menu_id: String,
        #[arg(long)]
        name: String,
        /// UK mobile number
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Email an invoice (requires --email)
        #[arg(long)]
        invoice: bool,
        /// ITEM=QUANTITY, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List orders placed against a menu as JSON
    Orders {
        menu_id: String,
    },
    /// Restaurant profile management
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create or update a profile from a JSON file
    Save {
        #[arg(long)]
        file: PathBuf,
    },
    Show {
        id: String,
    },
    List,
}

fn ocr_backend(config: &AppConfig) -> Box<dyn OcrBackend> {
    #[cfg(feature = "tesseract")]
    {
        let extraction = &config.extraction;
        let recognizer =
            menuform_ocr::TesseractRecognizer::new(extraction.data_path.clone(), &extraction.language);
        if let Err(e) = recognizer.probe() {
            tracing::warn!("Tesseract is not usable: {e}");
        }
        Box::new(recognizer)
    }
    #[cfg(not(feature = "tesseract"))]
    {
        let _ = config;
        tracing::debug!("built without the tesseract feature; recognition is unavailable");
        Box::new(menuform_ocr::UnavailableRecognizer)
    }
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "menuform", "Menuform")
        .context("could not determine a data directory; pass --data-dir")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let backend = ocr_backend(&config);
    let state = AppState::new(config, data_dir, backend);

    match cli.command {
        Commands::Extract { image } => commands::extract_menu(&state, &image).await,
        Commands::Publish { image, items, date } => {
            let request = PublishRequest {
                image: image.as_deref(),
                items: &items,
                date: date.as_deref(),
            };
            commands::publish_menu(&state, request).await
        }
        Commands::Edit { menu_id, items } => commands::edit_menu(&state, &menu_id, &items).await,
        Commands::Show { menu_id } => commands::show_menu(&state, &menu_id).await,
        Commands::Order { menu_id, name, phone, email, invoice, items, notes } => {
            let request = OrderRequest {
                menu_id: &menu_id,
                customer: CustomerDetails { name, phone, email, wants_invoice: invoice },
                items: &items,
                notes: &notes,
            };
            commands::place_order(&state, request).await
        }
        Commands::Orders { menu_id } => commands::list_orders(&state, &menu_id).await,
        Commands::Profile { action } => match action {
            ProfileCommands::Save { file } => commands::save_profile(&state, &file).await,
            ProfileCommands::Show { id } => commands::show_profile(&state, &id).await,
            ProfileCommands::List => commands::list_profiles(&state).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn order_arguments() {
        let cli = Cli::try_parse_from([
            "menuform", "order", "12042025_123456", "--name", "Ravi", "--phone", "07123456789",
            "--item", "Tea=2", "--item", "Vada=1",
        ])
        .unwrap();
        match cli.command {
            Commands::Order { items, invoice, .. } => {
                assert_eq!(items, vec!["Tea=2", "Vada=1"]);
                assert!(!invoice);
            }
            _ => panic!("expected order"),
        }
        assert_eq!(cli.config, PathBuf::from("menuform.toml"));
    }

    #[test]
    fn publish_accepts_typed_rows_without_image() {
        let cli = Cli::try_parse_from(["menuform", "publish", "--item", "Idli=3", "--item", "Chai=£1.20"])
            .unwrap();
        match cli.command {
            Commands::Publish { image, items, date } => {
                assert!(image.is_none());
                assert_eq!(items, vec!["Idli=3", "Chai=£1.20"]);
                assert!(date.is_none());
            }
            _ => panic!("expected publish"),
        }
        assert!(Cli::try_parse_from(["menuform", "edit", "m1"]).is_err());
    }

    #[test]
    fn order_requires_an_item() {
        assert!(Cli::try_parse_from(["menuform", "order", "m", "--name", "R", "--phone", "07123456789"]).is_err());
    }
}
