//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for all domain crates:
//! - `TestDataBuilder`: Deterministic test data generation
//! - `assertions`: Custom assertion helpers
//!
//! # Usage
//!
//! ```rust
//! use test_utils::TestDataBuilder;
//!
//! let builder = TestDataBuilder::from_test_name("my_test");
//!
//! let username = builder.name("user", "main");
//! let password = builder.password();
//! ```

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded random data.
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
    /// This is the recommended way to create a builder for consistent test data.
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_user");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// # Arguments
    ///
    /// * `prefix` - The type of record (e.g., "user", "role")
    /// * `suffix` - A unique identifier within the test (e.g., "main", "backup")
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// let name = builder.name("role", "main");
    /// // Returns: "test-role-12345-main"
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Generate a deterministic throwaway password for testing
    pub fn password(&self) -> String {
        format!("test-pw-{}", self.seed)
    }
}

/// Test assertion helpers
pub mod assertions {
    use std::collections::HashSet;

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that a membership set contains a key with a nice error message
    pub fn assert_member(set: &HashSet<String>, member: &str, context: &str) {
        assert!(
            set.contains(member),
            "{}: expected member '{}' in {:?}",
            context,
            member,
            set
        );
    }
}
