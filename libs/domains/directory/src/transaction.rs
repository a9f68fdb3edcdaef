//! Unit-of-work handling.
//!
//! Transactions are a cross-cutting concern, so they live in a decorator
//! around the service rather than inside it. Every public operation runs in
//! its own fresh unit of work: a failure in one directory call can neither
//! roll back nor be rolled back by anything the caller has in flight.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::{DirectoryError, DirectoryResult, StoreError};
use crate::models::{Role, User};
use crate::service::{DirectoryService, UserRoleDirectory};
use crate::store::DirectoryStore;

/// An atomic, all-or-nothing execution scope against the store.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Open a new, independent scope. Blocks until any in-flight scope on
    /// the same store has finished.
    async fn begin(&self) -> Result<(), StoreError>;

    /// Make every write since `begin` durable.
    async fn commit(&self) -> Result<(), StoreError>;

    /// Discard every write since `begin`.
    async fn rollback(&self) -> Result<(), StoreError>;
}

/// Optional startup callback, invoked once by [`TransactionalDirectory::init`]
/// after construction. Intended for collaborators that seed or reset data.
pub type InitHook =
    Box<dyn for<'a> Fn(&'a dyn UserRoleDirectory) -> BoxFuture<'a, DirectoryResult<()>> + Send + Sync>;

/// Wraps a [`DirectoryService`], beginning, committing, and rolling back a
/// unit of work around each operation.
///
/// On failure the whole operation is undone, including the member-by-member
/// edge edits of a membership pass, and the original error is re-raised.
pub struct TransactionalDirectory<S: DirectoryStore + UnitOfWork> {
    inner: DirectoryService<S>,
    store: Arc<S>,
    init_hook: Option<InitHook>,
}

impl<S: DirectoryStore + UnitOfWork + 'static> TransactionalDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            inner: DirectoryService::new(Arc::clone(&store)),
            store,
            init_hook: None,
        }
    }

    pub fn with_init_hook(mut self, hook: InitHook) -> Self {
        self.init_hook = Some(hook);
        self
    }

    /// Runs the init hook, if any. Hook failures are logged and swallowed;
    /// the directory is considered ready either way.
    pub async fn init(&self) {
        if let Some(hook) = &self.init_hook {
            if let Err(error) = hook(self as &dyn UserRoleDirectory).await {
                tracing::error!(%error, "initialization hook failed");
            }
        }
    }

    async fn run<T>(
        &self,
        operation: impl Future<Output = DirectoryResult<T>> + Send,
    ) -> DirectoryResult<T> {
        self.store.begin().await.map_err(DirectoryError::from)?;

        match operation.await {
            Ok(value) => {
                self.store.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.store.rollback().await {
                    tracing::error!(%rollback_error, "rollback failed");
                }
                Err(error)
            }
        }
    }
}

#[async_trait]
impl<S: DirectoryStore + UnitOfWork + 'static> UserRoleDirectory for TransactionalDirectory<S> {
    async fn create_user(&self, user: User) -> DirectoryResult<()> {
        self.run(self.inner.create_user(user)).await
    }

    async fn get_user(&self, username: &str) -> DirectoryResult<Option<User>> {
        self.run(self.inner.get_user(username)).await
    }

    async fn get_users(&self) -> DirectoryResult<Vec<User>> {
        self.run(self.inner.get_users()).await
    }

    async fn update_user(&self, user: User) -> DirectoryResult<()> {
        self.run(self.inner.update_user(user)).await
    }

    async fn delete_user(&self, username: &str) -> DirectoryResult<()> {
        self.run(self.inner.delete_user(username)).await
    }

    async fn create_role(&self, role: Role) -> DirectoryResult<()> {
        self.run(self.inner.create_role(role)).await
    }

    async fn get_role(&self, name: &str) -> DirectoryResult<Option<Role>> {
        self.run(self.inner.get_role(name)).await
    }

    async fn get_roles(&self) -> DirectoryResult<Vec<Role>> {
        self.run(self.inner.get_roles()).await
    }

    async fn update_role(&self, role: Role) -> DirectoryResult<()> {
        self.run(self.inner.update_role(role)).await
    }

    async fn delete_role(&self, name: &str) -> DirectoryResult<()> {
        self.run(self.inner.delete_role(name)).await
    }
}
