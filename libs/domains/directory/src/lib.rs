//! Directory Domain
//!
//! A user/role directory: users and roles with a many-to-many membership
//! relation between them, stored from both sides and kept consistent by a
//! dedicated synchronizer.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────┐
//! │ TransactionalDirectory │  ← one unit of work per operation
//! └───────────┬────────────┘
//!             │
//! ┌───────────▼────────────┐
//! │    DirectoryService    │  ← validation, uniqueness, existence
//! └───────────┬────────────┘
//!             │
//! ┌───────────▼────────────┐
//! │ MembershipSynchronizer │  ← edge deltas, both sides of the relation
//! └───────────┬────────────┘
//!             │
//! ┌───────────▼────────────┐
//! │     DirectoryStore     │  ← data access (trait + implementations)
//! └────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_directory::{
//!     sample_data_hook, InMemoryDirectoryStore, TransactionalDirectory,
//! };
//!
//! # async fn wire() {
//! let store = Arc::new(InMemoryDirectoryStore::new());
//! let directory = TransactionalDirectory::new(store)
//!     .with_init_hook(sample_data_hook());
//! directory.init().await;
//! # }
//! ```

pub mod error;
pub mod models;
pub mod seed;
pub mod service;
pub mod store;
pub mod sync;
pub mod transaction;

// Re-export commonly used types
pub use error::{DirectoryError, DirectoryResult, StoreError};
pub use models::{Role, User};
pub use seed::{sample_data_hook, seed_sample_directory};
pub use service::{DirectoryService, UserRoleDirectory};
pub use store::{DirectoryStore, InMemoryDirectoryStore};
pub use sync::MembershipSynchronizer;
pub use transaction::{InitHook, TransactionalDirectory, UnitOfWork};
