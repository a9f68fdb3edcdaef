use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{require_key, DirectoryError, DirectoryResult};
use crate::models::{Role, User};
use crate::store::DirectoryStore;
use crate::sync::MembershipSynchronizer;

/// The public CRUD contract for users and roles.
///
/// Every operation validates its key argument before touching the store.
/// Point lookups treat absence as a normal result; update and delete treat
/// it as [`DirectoryError::NotFound`].
#[async_trait]
pub trait UserRoleDirectory: Send + Sync {
    async fn create_user(&self, user: User) -> DirectoryResult<()>;

    async fn get_user(&self, username: &str) -> DirectoryResult<Option<User>>;

    /// All users, ascending by username.
    async fn get_users(&self) -> DirectoryResult<Vec<User>>;

    async fn update_user(&self, user: User) -> DirectoryResult<()>;

    async fn delete_user(&self, username: &str) -> DirectoryResult<()>;

    async fn create_role(&self, role: Role) -> DirectoryResult<()>;

    async fn get_role(&self, name: &str) -> DirectoryResult<Option<Role>>;

    /// All roles, ascending by name.
    async fn get_roles(&self) -> DirectoryResult<Vec<Role>>;

    async fn update_role(&self, role: Role) -> DirectoryResult<()>;

    async fn delete_role(&self, name: &str) -> DirectoryResult<()>;
}

/// Service layer for the directory. Enforces uniqueness and existence and
/// delegates every edge mutation to the [`MembershipSynchronizer`].
///
/// The service performs no transaction handling of its own; wrap it in a
/// [`crate::transaction::TransactionalDirectory`] to get one unit of work
/// per operation.
pub struct DirectoryService<S> {
    store: Arc<S>,
    sync: MembershipSynchronizer<S>,
}

impl<S: DirectoryStore> DirectoryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            sync: MembershipSynchronizer::new(Arc::clone(&store)),
            store,
        }
    }
}

#[async_trait]
impl<S: DirectoryStore> UserRoleDirectory for DirectoryService<S> {
    async fn create_user(&self, user: User) -> DirectoryResult<()> {
        require_key(user.username(), "username")?;
        require_key(user.password(), "password")?;

        if self.store.get_user(user.username()).await?.is_some() {
            return Err(DirectoryError::AlreadyExists(user.username().to_owned()));
        }
        self.store.save_user(&user).await?;

        self.sync.attach_user_roles(&user).await
    }

    async fn get_user(&self, username: &str) -> DirectoryResult<Option<User>> {
        require_key(username, "username")?;

        Ok(self.store.get_user(username).await?)
    }

    async fn get_users(&self) -> DirectoryResult<Vec<User>> {
        Ok(self.store.users().await?)
    }

    /// Merges the scalar attributes (password, description, enabled) onto
    /// the stored record. The membership set in the payload is ignored;
    /// membership changes flow through role operations only.
    async fn update_user(&self, user: User) -> DirectoryResult<()> {
        require_key(user.username(), "username")?;
        require_key(user.password(), "password")?;

        let mut current = self
            .store
            .get_user(user.username())
            .await?
            .ok_or_else(|| DirectoryError::NotFound(user.username().to_owned()))?;

        current.set_password(user.password());
        current.description = user.description;
        current.enabled = user.enabled;
        self.store.merge_user(&current).await?;
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> DirectoryResult<()> {
        require_key(username, "username")?;

        let user = self
            .store
            .get_user(username)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(username.to_owned()))?;

        self.sync.detach_user_roles(&user).await?;
        self.store.delete_user(username).await?;
        Ok(())
    }

    async fn create_role(&self, role: Role) -> DirectoryResult<()> {
        require_key(role.name(), "role name")?;

        if self.store.get_role(role.name()).await?.is_some() {
            return Err(DirectoryError::AlreadyExists(role.name().to_owned()));
        }
        self.store.save_role(&role).await?;

        self.sync.link_all(&role).await
    }

    async fn get_role(&self, name: &str) -> DirectoryResult<Option<Role>> {
        require_key(name, "role name")?;

        Ok(self.store.get_role(name).await?)
    }

    async fn get_roles(&self) -> DirectoryResult<Vec<Role>> {
        Ok(self.store.roles().await?)
    }

    /// Replaces the role record and reconciles its membership.
    ///
    /// The persisted membership set is snapshotted before the merge, since
    /// the merge itself already rewrites the role's member set to the
    /// desired one. Two callers updating the same role concurrently both
    /// diff against whatever snapshot they read; the last writer wins.
    async fn update_role(&self, role: Role) -> DirectoryResult<()> {
        require_key(role.name(), "role name")?;

        let original = self
            .store
            .get_role(role.name())
            .await?
            .ok_or_else(|| DirectoryError::NotFound(role.name().to_owned()))?;
        let original_members = original.users().clone();

        let merged = self.store.merge_role(&role).await?;

        self.sync.apply(&merged, &original_members).await
    }

    async fn delete_role(&self, name: &str) -> DirectoryResult<()> {
        require_key(name, "role name")?;

        let role = self
            .store
            .get_role(name)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(name.to_owned()))?;

        self.sync.unlink_all(&role).await?;
        self.store.delete_role(name).await?;
        Ok(())
    }
}
