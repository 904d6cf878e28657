//! Seed the database with the demo catalog and test accounts.
//!
//! Idempotent: every insert is an upsert keyed on the natural unique column
//! (category/product slug, user email), so re-running never duplicates and
//! never clobbers data changed since the first run.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use sqlx::PgPool;

use kemet_core::UserRole;

use super::{CommandError, connect};

struct SeedProduct {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    full_description: &'static str,
    price: Decimal,
    category_slug: &'static str,
    colors: &'static [&'static str],
    stock: i32,
}

const SEED_CATEGORIES: &[(&str, &str)] = &[
    ("Dresses", "dresses"),
    ("Robes", "robes"),
    ("Shirts", "shirts"),
];

const SEED_SIZES: &[&str] = &["S", "M", "L", "XL", "XXL"];

fn seed_products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Tutankhamun V-Neck Dress",
            slug: "tutankhamun-v-neck-dress",
            description: "Long sleeves, teal fabric with golden mask print",
            full_description: "Long sleeves, teal fabric with golden mask print. Inspired by \
                ancient Egyptian royalty. This stunning dress features the iconic golden mask of \
                Tutankhamun, Egypt's most famous pharaoh. Printed on premium fabric with vibrant, \
                long-lasting colors.",
            price: Decimal::from(700),
            category_slug: "dresses",
            colors: &["Teal", "Black", "Gold"],
            stock: 50,
        },
        SeedProduct {
            name: "Nefertiti Belted Robe",
            slug: "nefertiti-belted-robe",
            description: "Beige fabric with blue accents, detailed back print of the iconic queen",
            full_description: "Beige fabric with blue accents, detailed back print of the iconic \
                queen. Celebrate the legendary Queen Nefertiti, known for her timeless beauty. \
                This elegant robe includes a matching belt to accentuate the waist. Made from \
                flowing, comfortable fabric.",
            price: Decimal::from(700),
            category_slug: "robes",
            colors: &["Beige", "Blue", "White"],
            stock: 45,
        },
        SeedProduct {
            name: "Horus Falcon Long Shirt",
            slug: "horus-falcon-long-shirt",
            description: "Orange-gold tones with pyramid backdrop, symbolizing protection and power",
            full_description: "Orange-gold tones with pyramid backdrop, symbolizing protection \
                and power. A powerful design featuring Horus, the falcon-headed god of kingship \
                and the sky, soaring above the Great Pyramids. This comfortable long-sleeve shirt \
                combines ancient symbolism with modern style.",
            price: Decimal::from(700),
            category_slug: "shirts",
            colors: &["Orange", "Gold", "Black"],
            stock: 60,
        },
    ]
}

/// Seed the database.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a write fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Creating categories...");
    for (name, slug) in SEED_CATEGORIES {
        sqlx::query(
            "INSERT INTO store.categories (name, slug)
             VALUES ($1, $2)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(name)
        .bind(slug)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Creating products...");
    for product in seed_products() {
        let image = format!(
            "https://via.placeholder.com/500x600?text={}",
            product.name.replace(' ', "+")
        );
        sqlx::query(
            "INSERT INTO store.products
                 (name, slug, description, full_description, price, stock,
                  is_active, category_id, images, colors, sizes)
             SELECT $1, $2, $3, $4, $5, $6, TRUE, c.id, $7, $8, $9
             FROM store.categories c
             WHERE c.slug = $10
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(product.name)
        .bind(product.slug)
        .bind(product.description)
        .bind(product.full_description)
        .bind(product.price)
        .bind(product.stock)
        .bind(vec![image])
        .bind(product.colors.iter().map(|c| (*c).to_string()).collect::<Vec<_>>())
        .bind(SEED_SIZES.iter().map(|s| (*s).to_string()).collect::<Vec<_>>())
        .bind(product.category_slug)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Creating admin user...");
    seed_user(
        &pool,
        "admin@example.com",
        "admin123",
        "Admin User",
        UserRole::Admin,
    )
    .await?;
    tracing::info!("Admin user created (email: admin@example.com, password: admin123)");

    tracing::info!("Creating test customer...");
    seed_user(
        &pool,
        "customer@example.com",
        "customer123",
        "Test Customer",
        UserRole::Customer,
    )
    .await?;
    tracing::info!("Test customer created (email: customer@example.com, password: customer123)");

    tracing::info!("Database seeded successfully!");
    Ok(())
}

async fn seed_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    name: &str,
    role: UserRole,
) -> Result<(), CommandError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CommandError::PasswordHash)?
        .to_string();

    sqlx::query(
        "INSERT INTO store.users (email, password_hash, name, role)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(email)
    .bind(&password_hash)
    .bind(name)
    .bind(role.to_string())
    .execute(pool)
    .await?;

    Ok(())
}
