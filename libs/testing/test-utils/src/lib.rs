//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: PostgreSQL container with migrations applied (feature: "postgres")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let title = builder.title("chair");
//!     let image = builder.png_image();
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_product");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A product title unique to this builder, always long enough to validate
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let title = TestDataBuilder::new(7).title("chair");
    /// assert_eq!(title, "test-chair-7");
    /// ```
    pub fn title(&self, suffix: &str) -> String {
        format!("test-{}-{}", suffix, self.seed)
    }

    /// A description of at least ten characters
    pub fn description(&self, suffix: &str) -> String {
        format!("Description of {} ({})", suffix, self.seed)
    }

    /// Price in `[0, 1000)` with two decimals
    pub fn price(&self) -> f64 {
        (self.seed % 100_000) as f64 / 100.0
    }

    /// Stock in `[0, 500)`
    pub fn stock(&self) -> i32 {
        (self.seed % 500) as i32
    }

    /// Bytes that pass PNG sniffing; distinct per seed so content hashes differ
    pub fn png_image(&self) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&self.seed.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 32]);
        bytes
    }

    /// Bytes that pass JPEG sniffing; distinct per seed
    pub fn jpeg_image(&self) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend_from_slice(&self.seed.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 32]);
        bytes
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    /// Assert that two UUIDs are equal with a nice error message
    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert a stored image name is `<64 hex chars>.<extension>`
    pub fn assert_content_hash_name(name: &str, extension: &str) {
        let (hash, ext) = name
            .rsplit_once('.')
            .unwrap_or_else(|| panic!("image name {name:?} has no extension"));
        assert_eq!(ext, extension, "extension of {name:?}");
        assert_eq!(hash.len(), 64, "hash length of {name:?}");
        assert!(
            hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
            "{name:?} is not lowercase hex"
        );
    }
}
