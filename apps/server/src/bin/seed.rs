//! Seeds the database with demo data: categories, products, several
//! months of backdated transactions, and expenses. Wipes existing rows
//! first; development use only.
//!
//! ```text
//! STOCKBOOK_DATABASE=stockbook.db cargo run --bin seed
//! ```

use chrono::{DateTime, Datelike, Duration, Utc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stockbook_core::engine::{RequestedItem, TransactionRequest};
use stockbook_core::{PaymentMethod, TransactionKind};
use stockbook_db::{CategoryInput, Database, DbConfig, ExpenseInput, ProductInput};
use stockbook_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    db.wipe_all().await?;
    let now = Utc::now();

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------
    let electronics = db
        .categories()
        .insert(CategoryInput {
            name: "Electronics".to_string(),
            description: Some("Phones, chargers, audio".to_string()),
        })
        .await?;
    let accessories = db
        .categories()
        .insert(CategoryInput {
            name: "Accessories".to_string(),
            description: Some("Cases, cables, small parts".to_string()),
        })
        .await?;
    let stationery = db
        .categories()
        .insert(CategoryInput {
            name: "Stationery".to_string(),
            description: None,
        })
        .await?;
    info!("Seeded 3 categories");

    // ------------------------------------------------------------------
    // Products: (name, category, cost, sell, threshold)
    // ------------------------------------------------------------------
    let catalog = [
        ("USB-C Charger 30W", &electronics, 1_200, 2_500, 5),
        ("Wireless Earbuds", &electronics, 3_500, 6_900, 3),
        ("Bluetooth Speaker", &electronics, 4_000, 7_500, 3),
        ("Phone Case (Clear)", &accessories, 300, 1_200, 10),
        ("Lightning Cable 1m", &accessories, 250, 900, 10),
        ("Screen Protector", &accessories, 150, 800, 15),
        ("A5 Notebook", &stationery, 180, 450, 20),
        ("Gel Pen (Black)", &stationery, 40, 150, 30),
    ];

    let mut products = Vec::new();
    for (name, category, cost, sell, threshold) in catalog {
        let product = db
            .products()
            .insert(ProductInput {
                name: name.to_string(),
                category_id: Some(category.id.clone()),
                quantity: 0,
                cost_price_cents: cost,
                selling_price_cents: sell,
                supplier: Some("Acme Wholesale".to_string()),
                notes: None,
                low_stock_threshold: Some(threshold),
            })
            .await?;
        products.push(product);
    }
    info!(count = products.len(), "Seeded products");

    // ------------------------------------------------------------------
    // Six months of history: a restocking purchase at the start of each
    // month, sales spread over its days.
    // ------------------------------------------------------------------
    let mut transaction_count = 0;
    for months_back in (0..6).rev() {
        let month_start = month_start_back(now, months_back);

        let purchase = TransactionRequest {
            kind: TransactionKind::Purchase,
            items: products
                .iter()
                .map(|p| RequestedItem {
                    product_id: p.id.clone(),
                    quantity: 30,
                    unit_price_cents: p.cost_price_cents,
                })
                .collect(),
            party_name: Some("Acme Wholesale".to_string()),
            payment_method: PaymentMethod::Online,
            discount_cents: 0,
            notes: Some("Monthly restock".to_string()),
            date: Some(month_start),
        };
        db.transactions().apply(&purchase).await?;
        transaction_count += 1;

        for day_offset in [2, 5, 9, 12, 16, 20, 24] {
            let date = month_start + Duration::days(day_offset) + Duration::hours(11);
            if date > now {
                break;
            }
            let product = &products[(day_offset as usize) % products.len()];
            let quantity = 1 + (day_offset % 3);
            let sale = TransactionRequest {
                kind: TransactionKind::Sale,
                items: vec![RequestedItem {
                    product_id: product.id.clone(),
                    quantity,
                    unit_price_cents: product.selling_price_cents,
                }],
                party_name: Some("Walk-in customer".to_string()),
                payment_method: if day_offset % 2 == 0 {
                    PaymentMethod::Cash
                } else {
                    PaymentMethod::Card
                },
                discount_cents: if day_offset == 16 { 200 } else { 0 },
                notes: None,
                date: Some(date),
            };
            db.transactions().apply(&sale).await?;
            transaction_count += 1;
        }

        db.expenses()
            .insert(ExpenseInput {
                title: "Shop rent".to_string(),
                amount_cents: 45_000,
                category: Some("rent".to_string()),
                date: Some(month_start + Duration::hours(9)),
                notes: None,
            })
            .await?;
        db.expenses()
            .insert(ExpenseInput {
                title: "Electricity".to_string(),
                amount_cents: 6_500,
                category: Some("utilities".to_string()),
                date: Some(month_start + Duration::days(14)),
                notes: None,
            })
            .await?;
    }

    info!(
        transactions = transaction_count,
        "Seed complete"
    );
    db.close().await;
    Ok(())
}

/// Midnight on the first day of the month `months_back` months before
/// `reference`.
fn month_start_back(reference: DateTime<Utc>, months_back: i32) -> DateTime<Utc> {
    let total = reference.year() * 12 + reference.month() as i32 - 1 - months_back;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    stockbook_core::period::month_bounds(year, month)
        .expect("valid month from arithmetic")
        .start
}
