//! Test doubles for the store traits.
//!
//! [`MemoryStore`] is a working in-process store with the same transactional
//! guarantees as [`crate::PgStore`]; [`MockStore`] is a mockall double for
//! asserting on individual calls or forcing failures.

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::MockStore;

#[cfg(test)]
pub async fn create_test_pool() -> Option<crate::DbPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = crate::create_pool(&database_url, 4)
        .await
        .expect("Failed to connect to test database");

    crate::schema::initialize_database(&pool)
        .await
        .expect("Failed to initialize test database schema");

    Some(pool)
}
