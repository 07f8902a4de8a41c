//! Seed the database with sample data for local development.

use tracing::info;

use minimart_server::config::ServerConfig;
use minimart_server::db::{self, ProductRepository, UserRepository};
use minimart_server::models::{NewProduct, NewUser};

const SAMPLE_PRODUCTS: &[(&str, i64)] = &[
    ("Desk Lamp", 25),
    ("Office Chair", 12),
    ("Standing Desk", 5),
    ("Monitor Stand", 0),
];

/// Insert a demo user and a handful of products.
///
/// Safe to run more than once; a seeded login that already exists is
/// skipped.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a database
/// operation fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    let users = UserRepository::new(&pool);
    let demo = NewUser::parse("demo", "demo@example.com", 30)?;
    if users.login_exists(&demo.login).await? {
        info!("Demo user already present, skipping");
    } else {
        let user = users.create(&demo).await?;
        info!(user_id = %user.id, "Created demo user");
    }

    let products = ProductRepository::new(&pool);
    if products.list().await?.is_empty() {
        for &(name, stock) in SAMPLE_PRODUCTS {
            let product = products
                .create(&NewProduct::parse(name, stock, None)?)
                .await?;
            info!(product_id = %product.id, name, stock, "Created product");
        }
    } else {
        info!("Products already present, skipping");
    }

    info!("Seeding complete!");
    Ok(())
}
