use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use menuform_core::{CustomerDetails, MenuRow, MenuTable, Order, Price, RestaurantProfile};
use menuform_ocr::{ExtractionResult, MenuPipeline, OcrBackend};
use menuform_storage::DbPool;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

use crate::config::AppConfig;

pub struct AppState {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub pipeline: MenuPipeline<Box<dyn OcrBackend>>,
    db: OnceCell<DbPool>,
}

impl AppState {
    pub fn new(config: AppConfig, data_dir: PathBuf, backend: Box<dyn OcrBackend>) -> Self {
        let pipeline = MenuPipeline::new(backend, config.extraction.clone());
        Self { config, data_dir, pipeline, db: OnceCell::new() }
    }

    /// Opened on first use; `extract` never touches the database.
    async fn db(&self) -> Result<&DbPool> {
        self.db
            .get_or_try_init(|| async {
                std::fs::create_dir_all(&self.data_dir)
                    .with_context(|| format!("creating {}", self.data_dir.display()))?;
                let path = self.data_dir.join("menuform.db");
                menuform_storage::create_db(&path)
                    .await
                    .with_context(|| format!("opening {}", path.display()))
            })
            .await
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Admin: menu extraction and publishing ─────────────────────────────────────

async fn extract(state: &AppState, image: &Path) -> Result<ExtractionResult> {
    if !state.config.admin.enable_image_upload {
        bail!("Menu image upload is disabled in the admin configuration");
    }
    tracing::info!("Extracting menu from {}", image.display());
    let result = state
        .pipeline
        .extract_menu_from_file(image, &state.config.restaurant.currency)
        .await?;
    if !result.success {
        tracing::warn!("No menu items recognized; please enter or edit the menu manually");
    } else if result.date.needs_review() {
        tracing::warn!("Menu date {} could not be read from the image; please verify", result.date.display);
    }
    Ok(result)
}

pub async fn extract_menu(state: &AppState, image: &Path) -> Result<()> {
    print_json(&extract(state, image).await?)
}

/// `"Masala Dosa=6.50"` or `"Masala Dosa=£6.50"` → a menu row.
pub fn parse_menu_row_arg(arg: &str, currency: &str) -> Result<MenuRow> {
    let (item, price) = arg
        .rsplit_once('=')
        .with_context(|| format!("expected ITEM=PRICE, got '{arg}'"))?;
    let price = price.trim();
    let price: Price = price
        .strip_prefix(currency.trim())
        .unwrap_or(price)
        .parse()
        .map_err(anyhow::Error::msg)?;
    MenuRow::new(item, price).with_context(|| format!("missing item name in '{arg}'"))
}

/// Rows typed by the admin. Refused unless manual entry is enabled.
fn typed_rows(state: &AppState, items: &[String]) -> Result<Vec<MenuRow>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    if !state.config.admin.manual_menu_entry {
        bail!("Manual menu entry is disabled in the admin configuration");
    }
    let currency = &state.config.restaurant.currency;
    items.iter().map(|arg| parse_menu_row_arg(arg, currency)).collect()
}

pub struct PublishRequest<'a> {
    pub image: Option<&'a Path>,
    /// `Name=price` rows appended after the recognized ones.
    pub items: &'a [String],
    /// `DD/MM/YYYY`; overrides the recognized date.
    pub date: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Published {
    menu_id: String,
    order_link: String,
    menu_date: String,
    items: usize,
}

async fn publish(state: &AppState, request: PublishRequest<'_>) -> Result<Published> {
    let typed = typed_rows(state, request.items)?;

    let (mut menu, recognized_date) = match request.image {
        Some(image) => {
            let result = extract(state, image).await?;
            (result.menu, Some(result.date.date))
        }
        None if typed.is_empty() => bail!("Give a menu image or --item rows to publish"),
        None => (MenuTable::new(), None),
    };
    for row in typed {
        menu.push(row);
    }
    if menu.is_empty() {
        if state.config.admin.manual_menu_entry {
            bail!("No menu items were recognized; add them with --item \"Name=price\"");
        }
        bail!("No menu items were recognized; nothing to publish");
    }

    let menu_date = match request.date {
        Some(d) => NaiveDate::parse_from_str(d, "%d/%m/%Y")
            .with_context(|| format!("--date must be DD/MM/YYYY, got '{d}'"))?,
        None => recognized_date.unwrap_or_else(|| Local::now().date_naive()),
    };

    let restaurant = &state.config.restaurant;
    let menu_id = menuform_core::menu_id(menu_date, &Local::now());
    let order_link = menuform_core::order_link(&restaurant.base_url, &menu_id);

    menuform_storage::save_menu(state.db().await?, &menu_id, &order_link, menu_date, &menu).await?;
    tracing::info!("Menu {menu_id} published with {} items", menu.len());

    Ok(Published {
        menu_id,
        order_link,
        menu_date: menu_date.format("%d-%b-%Y").to_string(),
        items: menu.len(),
    })
}

pub async fn publish_menu(state: &AppState, request: PublishRequest<'_>) -> Result<()> {
    print_json(&publish(state, request).await?)
}

/// Replace every row of a stored menu, keeping its id, link and date.
async fn rewrite_menu(state: &AppState, menu_id: &str, items: &[String]) -> Result<MenuTable> {
    if items.is_empty() {
        bail!("Give the menu rows with --item \"Name=price\"");
    }
    let menu: MenuTable = typed_rows(state, items)?.into();
    let db = state.db().await?;
    let Some(stored) = menuform_storage::load_menu(db, menu_id).await? else {
        bail!("Menu not found. Please upload a menu first.");
    };
    menuform_storage::save_menu(db, &stored.id, &stored.order_link, stored.menu_date, &menu).await?;
    tracing::info!("Menu {menu_id} rewritten with {} items", menu.len());
    Ok(menu)
}

pub async fn edit_menu(state: &AppState, menu_id: &str, items: &[String]) -> Result<()> {
    rewrite_menu(state, menu_id, items).await?;
    show_menu(state, menu_id).await
}

pub async fn show_menu(state: &AppState, menu_id: &str) -> Result<()> {
    let Some(menu) = menuform_storage::load_menu(state.db().await?, menu_id).await? else {
        bail!("Menu not found. Please upload a menu first.");
    };
    let restaurant = &state.config.restaurant;
    println!("{}", restaurant.title());
    println!("Menu Items for {}", menu.menu_date_display());
    for (n, row) in menu.items.rows().iter().enumerate() {
        println!("{:>3}. {} ({})", n + 1, row.item, row.price.display_with(&restaurant.currency));
    }
    println!("Order form: {}", menu.order_link);
    Ok(())
}

// ── Customer: ordering ────────────────────────────────────────────────────────

/// `"Garlic Naan=2"` → `("Garlic Naan", 2)`.
pub fn parse_item_arg(arg: &str) -> Result<(String, u32)> {
    let (item, qty) = arg
        .rsplit_once('=')
        .with_context(|| format!("expected ITEM=QUANTITY, got '{arg}'"))?;
    let qty: u32 = qty
        .trim()
        .parse()
        .with_context(|| format!("invalid quantity in '{arg}'"))?;
    if item.trim().is_empty() {
        bail!("missing item name in '{arg}'");
    }
    Ok((item.trim().to_string(), qty))
}

pub struct OrderRequest<'a> {
    pub menu_id: &'a str,
    pub customer: CustomerDetails,
    pub items: &'a [String],
    pub notes: &'a str,
}

pub async fn place_order(state: &AppState, request: OrderRequest<'_>) -> Result<()> {
    let db = state.db().await?;
    let menu = match menuform_storage::load_menu(db, request.menu_id).await? {
        Some(m) if !m.items.is_empty() => m,
        _ => bail!("Menu not found or is empty."),
    };

    let requested = request
        .items
        .iter()
        .map(|s| parse_item_arg(s))
        .collect::<Result<Vec<_>>>()?;

    let order = Order::build(
        request.menu_id,
        &menu.items,
        request.customer,
        &requested,
        request.notes,
        &state.config.menu,
        Local::now().naive_local(),
    )?;
    let order_id = menuform_storage::save_order(db, &order).await?;
    tracing::info!("Order {order_id} stored");

    let currency = &state.config.restaurant.currency;
    println!("{}", state.config.restaurant.title());
    println!("Order Summary ({order_id})");
    for line in &order.lines {
        println!("• {} x {} = {}", line.item, line.quantity, line.total().display_with(currency));
    }
    println!("Total: {}", order.total().display_with(currency));
    Ok(())
}

pub async fn list_orders(state: &AppState, menu_id: &str) -> Result<()> {
    let rows = menuform_storage::orders_for_menu(state.db().await?, menu_id).await?;
    print_json(&rows)
}

// ── Restaurant profiles ───────────────────────────────────────────────────────

pub async fn save_profile(state: &AppState, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let profile: RestaurantProfile =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", file.display()))?;
    if profile.name.trim().is_empty() {
        bail!("Restaurant name is required");
    }
    let saved = menuform_storage::save_profile(state.db().await?, &profile, Local::now().naive_local()).await?;
    print_json(&saved)
}

pub async fn show_profile(state: &AppState, id: &str) -> Result<()> {
    match menuform_storage::load_profile(state.db().await?, id).await? {
        Some(p) => print_json(&p),
        None => bail!("No restaurant profile with id '{id}'"),
    }
}

pub async fn list_profiles(state: &AppState) -> Result<()> {
    print_json(&menuform_storage::all_profiles(state.db().await?).await?)
}
