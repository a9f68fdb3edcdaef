use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::error::StoreError;
use crate::models::{Role, User};
use crate::transaction::UnitOfWork;

/// Durable key-by-name lookup and upsert for user and role records.
///
/// The trait is the boundary between the directory core and whatever holds
/// the records. Listing operations return records in ascending key order;
/// that ordering is part of the contract, not an implementation accident.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn get_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn get_role(&self, name: &str) -> Result<Option<Role>, StoreError>;

    /// All user records, ascending by username.
    async fn users(&self) -> Result<Vec<User>, StoreError>;

    /// All role records, ascending by name.
    async fn roles(&self) -> Result<Vec<Role>, StoreError>;

    /// Insert a new record. Fails with [`StoreError::DuplicateKey`] if the
    /// key is already present.
    async fn save_user(&self, user: &User) -> Result<(), StoreError>;

    async fn save_role(&self, role: &Role) -> Result<(), StoreError>;

    /// Replace an existing record. Fails with [`StoreError::MissingRecord`]
    /// if the key is not present.
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;

    async fn update_role(&self, role: &Role) -> Result<(), StoreError>;

    /// Copy the incoming record's state onto the stored record and return
    /// the merged record. Fails with [`StoreError::MissingRecord`] if the
    /// key is not present.
    async fn merge_user(&self, user: &User) -> Result<User, StoreError>;

    async fn merge_role(&self, role: &Role) -> Result<Role, StoreError>;

    /// Remove a record, reporting whether anything was removed.
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError>;

    async fn delete_role(&self, name: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Default, Clone)]
struct DirectoryState {
    users: BTreeMap<String, User>,
    roles: BTreeMap<String, Role>,
}

struct ActiveUnitOfWork {
    snapshot: DirectoryState,
    _serial: OwnedMutexGuard<()>,
}

/// In-memory implementation of [`DirectoryStore`] (for development/testing).
///
/// Also implements the [`UnitOfWork`] boundary: `begin` snapshots the whole
/// state, `commit` discards the snapshot, and `rollback` restores it. A
/// single-slot gate serializes units of work, so each one is a new,
/// independent scope rather than a participant in some caller-side
/// transaction.
#[derive(Clone, Default)]
pub struct InMemoryDirectoryStore {
    state: Arc<RwLock<DirectoryState>>,
    active: Arc<Mutex<Option<ActiveUnitOfWork>>>,
    gate: Arc<Mutex<()>>,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn get_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.get(username).cloned())
    }

    async fn get_role(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let state = self.state.read().await;
        Ok(state.roles.get(name).cloned())
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().cloned().collect())
    }

    async fn roles(&self) -> Result<Vec<Role>, StoreError> {
        let state = self.state.read().await;
        Ok(state.roles.values().cloned().collect())
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if state.users.contains_key(user.username()) {
            return Err(StoreError::DuplicateKey(user.username().to_owned()));
        }
        state.users.insert(user.username().to_owned(), user.clone());

        tracing::info!(username = %user.username(), "created user record");
        Ok(())
    }

    async fn save_role(&self, role: &Role) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if state.roles.contains_key(role.name()) {
            return Err(StoreError::DuplicateKey(role.name().to_owned()));
        }
        state.roles.insert(role.name().to_owned(), role.clone());

        tracing::info!(name = %role.name(), "created role record");
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        let stored = state
            .users
            .get_mut(user.username())
            .ok_or_else(|| StoreError::MissingRecord(user.username().to_owned()))?;
        *stored = user.clone();

        tracing::info!(username = %user.username(), "updated user record");
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        let stored = state
            .roles
            .get_mut(role.name())
            .ok_or_else(|| StoreError::MissingRecord(role.name().to_owned()))?;
        *stored = role.clone();

        tracing::info!(name = %role.name(), "updated role record");
        Ok(())
    }

    async fn merge_user(&self, user: &User) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        let stored = state
            .users
            .get_mut(user.username())
            .ok_or_else(|| StoreError::MissingRecord(user.username().to_owned()))?;
        *stored = user.clone();

        tracing::info!(username = %user.username(), "merged user record");
        Ok(stored.clone())
    }

    async fn merge_role(&self, role: &Role) -> Result<Role, StoreError> {
        let mut state = self.state.write().await;

        let stored = state
            .roles
            .get_mut(role.name())
            .ok_or_else(|| StoreError::MissingRecord(role.name().to_owned()))?;
        *stored = role.clone();

        tracing::info!(name = %role.name(), "merged role record");
        Ok(stored.clone())
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        if state.users.remove(username).is_some() {
            tracing::info!(%username, "deleted user record");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_role(&self, name: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        if state.roles.remove(name).is_some() {
            tracing::info!(%name, "deleted role record");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryDirectoryStore {
    async fn begin(&self) -> Result<(), StoreError> {
        // Waits here until any in-flight unit of work commits or rolls back.
        let serial = Arc::clone(&self.gate).lock_owned().await;
        let snapshot = self.state.read().await.clone();

        *self.active.lock().await = Some(ActiveUnitOfWork {
            snapshot,
            _serial: serial,
        });
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        self.active
            .lock()
            .await
            .take()
            .ok_or(StoreError::NoActiveUnitOfWork)?;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        let undone = self
            .active
            .lock()
            .await
            .take()
            .ok_or(StoreError::NoActiveUnitOfWork)?;

        *self.state.write().await = undone.snapshot;
        tracing::debug!("rolled back unit of work");
        Ok(())
    }
}
