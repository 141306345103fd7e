use chrono::{NaiveDate, NaiveDateTime};
use menuform_core::{MenuRow, MenuTable, Order, Price, RestaurantProfile};
use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS menus (
            id TEXT PRIMARY KEY,
            order_link TEXT NOT NULL,
            menu_date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS menu_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            menu_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            item TEXT NOT NULL,
            price_pence INTEGER NOT NULL,
            FOREIGN KEY (menu_id) REFERENCES menus(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id TEXT NOT NULL,
            menu_id TEXT NOT NULL,
            placed_at TEXT NOT NULL,
            customer_name TEXT NOT NULL,
            customer_email TEXT NOT NULL,
            customer_phone TEXT NOT NULL,
            item_name TEXT NOT NULL,
            item_price_pence INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            item_total_pence INTEGER NOT NULL,
            special_instructions TEXT NOT NULL DEFAULT '',
            FOREIGN KEY (menu_id) REFERENCES menus(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS restaurant_profiles (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            currency TEXT NOT NULL DEFAULT '',
            logo_url TEXT NOT NULL DEFAULT '',
            theme_color TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn pence(price: Price) -> Result<i64, sqlx::Error> {
    price
        .to_pence()
        .ok_or_else(|| sqlx::Error::Encode(format!("price {price} out of range").into()))
}

fn price_from_pence(value: i64) -> Result<Price, sqlx::Error> {
    Price::from_pence(value)
        .ok_or_else(|| sqlx::Error::Decode(format!("negative price {value}").into()))
}

// ── Menus ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StoredMenu {
    pub id: String,
    pub order_link: String,
    pub menu_date: NaiveDate,
    pub items: MenuTable,
    pub created_at: String,
}

impl StoredMenu {
    /// `DD-Mon-YYYY`, the form shown alongside a published menu.
    pub fn menu_date_display(&self) -> String {
        self.menu_date.format("%d-%b-%Y").to_string()
    }
}

/// Create or overwrite a menu. Rows are replaced wholesale, keeping their order.
pub async fn save_menu(
    pool: &DbPool,
    menu_id: &str,
    order_link: &str,
    menu_date: NaiveDate,
    items: &MenuTable,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO menus (id, order_link, menu_date) VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET order_link = excluded.order_link, menu_date = excluded.menu_date
        "#,
    )
    .bind(menu_id)
    .bind(order_link)
    .bind(menu_date)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM menu_items WHERE menu_id = ?")
        .bind(menu_id)
        .execute(&mut *tx)
        .await?;

    for (position, row) in items.rows().iter().enumerate() {
        sqlx::query("INSERT INTO menu_items (menu_id, position, item, price_pence) VALUES (?, ?, ?, ?)")
            .bind(menu_id)
            .bind(position as i64)
            .bind(&row.item)
            .bind(pence(row.price)?)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await
}

pub async fn load_menu(pool: &DbPool, menu_id: &str) -> Result<Option<StoredMenu>, sqlx::Error> {
    let header = sqlx::query_as::<_, (String, String, NaiveDate, String)>(
        "SELECT id, order_link, menu_date, created_at FROM menus WHERE id = ?",
    )
    .bind(menu_id)
    .fetch_optional(pool)
    .await?;

    let Some((id, order_link, menu_date, created_at)) = header else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT item, price_pence FROM menu_items WHERE menu_id = ? ORDER BY position",
    )
    .bind(menu_id)
    .fetch_all(pool)
    .await?;

    let mut items = MenuTable::new();
    for (item, price_pence) in rows {
        let price = price_from_pence(price_pence)?;
        match MenuRow::new(&item, price) {
            Some(row) => items.push(row),
            None => return Err(sqlx::Error::Decode("blank menu item".into())),
        }
    }

    Ok(Some(StoredMenu { id, order_link, menu_date, items, created_at }))
}

// ── Orders ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub placed_at: NaiveDateTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub item_name: String,
    pub item_price: Price,
    pub quantity: u32,
    pub item_total: Price,
    pub special_instructions: String,
}

/// Persist an order as one row per line. Returns the order id.
pub async fn save_order(pool: &DbPool, order: &Order) -> Result<String, sqlx::Error> {
    let mut tx = pool.begin().await?;

    for line in &order.lines {
        sqlx::query(
            r#"
            INSERT INTO orders (
                order_id, menu_id, placed_at, customer_name, customer_email, customer_phone,
                item_name, item_price_pence, quantity, item_total_pence, special_instructions
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.order_id)
        .bind(&order.menu_id)
        .bind(order.placed_at)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&line.item)
        .bind(pence(line.price)?)
        .bind(line.quantity as i64)
        .bind(pence(line.total())?)
        .bind(&order.special_instructions)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(order.order_id.clone())
}

type OrderRow = (String, NaiveDateTime, String, String, String, String, i64, i64, i64, String);

pub async fn orders_for_menu(pool: &DbPool, menu_id: &str) -> Result<Vec<OrderRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT order_id, placed_at, customer_name, customer_email, customer_phone,
               item_name, item_price_pence, quantity, item_total_pence, special_instructions
        FROM orders WHERE menu_id = ? ORDER BY id
        "#,
    )
    .bind(menu_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| -> Result<OrderRecord, sqlx::Error> {
            Ok(OrderRecord {
                order_id: r.0,
                placed_at: r.1,
                customer_name: r.2,
                customer_email: r.3,
                customer_phone: r.4,
                item_name: r.5,
                item_price: price_from_pence(r.6)?,
                quantity: u32::try_from(r.7).map_err(|e| sqlx::Error::Decode(e.into()))?,
                item_total: price_from_pence(r.8)?,
                special_instructions: r.9,
            })
        })
        .collect()
}

// ── Restaurant profiles ───────────────────────────────────────────────────────

/// Insert or update a profile. `created_at` survives updates; `updated_at` is refreshed.
pub async fn save_profile(
    pool: &DbPool,
    profile: &RestaurantProfile,
    now: NaiveDateTime,
) -> Result<RestaurantProfile, sqlx::Error> {
    let id = profile.id_or_new(now);
    let created_at = profile.created_at.unwrap_or(now);

    sqlx::query(
        r#"
        INSERT INTO restaurant_profiles (
            id, name, address, phone, email, currency, logo_url, theme_color, description,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            address = excluded.address,
            phone = excluded.phone,
            email = excluded.email,
            currency = excluded.currency,
            logo_url = excluded.logo_url,
            theme_color = excluded.theme_color,
            description = excluded.description,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&id)
    .bind(&profile.name)
    .bind(&profile.address)
    .bind(&profile.phone)
    .bind(&profile.email)
    .bind(&profile.currency)
    .bind(&profile.logo_url)
    .bind(&profile.theme_color)
    .bind(&profile.description)
    .bind(created_at)
    .bind(now)
    .execute(pool)
    .await?;

    load_profile(pool, &id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

type ProfileRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    NaiveDateTime,
    NaiveDateTime,
);

const PROFILE_COLUMNS: &str = "id, name, address, phone, email, currency, logo_url, theme_color, \
description, created_at, updated_at";

fn profile_from_row(r: ProfileRow) -> RestaurantProfile {
    RestaurantProfile {
        id: r.0,
        name: r.1,
        address: r.2,
        phone: r.3,
        email: r.4,
        currency: r.5,
        logo_url: r.6,
        theme_color: r.7,
        description: r.8,
        created_at: Some(r.9),
        updated_at: Some(r.10),
    }
}

pub async fn load_profile(pool: &DbPool, id: &str) -> Result<Option<RestaurantProfile>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM restaurant_profiles WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(profile_from_row))
}

pub async fn all_profiles(pool: &DbPool) -> Result<Vec<RestaurantProfile>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM restaurant_profiles ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(profile_from_row).collect())
}
