//! Database schema definitions
//!
//! This module contains the SQL schema for the product store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per scraped product; every field is stored as text
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    brand TEXT NOT NULL,
    price TEXT NOT NULL,
    cart_count TEXT NOT NULL,
    favorite_count TEXT NOT NULL,
    rating_score TEXT NOT NULL,
    rating_count TEXT NOT NULL,
    promotions TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
