//! Membership synchronization.
//!
//! The user/role relation is stored from both sides: a user record carries
//! the names of its roles and a role record carries the names of its
//! members. Role records are written wholesale, so the user-side half of
//! every edge has to be managed here, member by member. This module is the
//! single authoritative entry point for edge mutations; nothing else writes
//! one side of the relation without writing the other.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{require_key, DirectoryError, DirectoryResult};
use crate::models::{Role, User};
use crate::store::DirectoryStore;

/// Computes and applies the edge edits needed to move the relation between
/// a role's persisted membership and a desired one.
pub struct MembershipSynchronizer<S> {
    store: Arc<S>,
}

impl<S: DirectoryStore> MembershipSynchronizer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Edge-addition pass for a freshly created role: every user attached
    /// to the payload gains the role. There is no prior state to diff
    /// against, so every attached member is an addition.
    pub async fn link_all(&self, role: &Role) -> DirectoryResult<()> {
        for username in role.users() {
            self.link(role, username).await?;
        }
        Ok(())
    }

    /// Delta pass for a role update. `original` is the membership snapshot
    /// taken before the role record itself was merged; the desired set is
    /// whatever the merged role now carries. The relative complements give
    /// the users to add and the users to remove.
    ///
    /// A missing member aborts the pass with [`DirectoryError::NotFound`];
    /// undoing the edits already applied is the enclosing unit of work's
    /// job.
    pub async fn apply(&self, role: &Role, original: &HashSet<String>) -> DirectoryResult<()> {
        let desired = role.users();

        for username in desired.difference(original) {
            self.link(role, username).await?;
        }
        for username in original.difference(desired) {
            self.unlink(role, username).await?;
        }
        Ok(())
    }

    /// Edge-removal pass for a role about to be deleted: every current
    /// member loses the role, so no dangling edge remains on the user side.
    pub async fn unlink_all(&self, role: &Role) -> DirectoryResult<()> {
        for username in role.users() {
            self.unlink(role, username).await?;
        }
        Ok(())
    }

    /// Mirror pass for a freshly created user: every role named by the
    /// payload gains the user as a member.
    pub async fn attach_user_roles(&self, user: &User) -> DirectoryResult<()> {
        for name in user.roles() {
            require_key(name, "role name")?;

            let mut role = self
                .store
                .get_role(name)
                .await?
                .ok_or_else(|| DirectoryError::NotFound(name.clone()))?;
            if role.add_user(user) {
                self.store.update_role(&role).await?;
            }
        }
        Ok(())
    }

    /// Mirror pass for a user about to be deleted: the username is pruned
    /// from every role it belongs to, keeping both sides of the relation
    /// consistent at rest.
    pub async fn detach_user_roles(&self, user: &User) -> DirectoryResult<()> {
        for name in user.roles() {
            require_key(name, "role name")?;

            let mut role = self
                .store
                .get_role(name)
                .await?
                .ok_or_else(|| DirectoryError::NotFound(name.clone()))?;
            if role.remove_user(user) {
                self.store.update_role(&role).await?;
            }
        }
        Ok(())
    }

    async fn link(&self, role: &Role, username: &str) -> DirectoryResult<()> {
        require_key(username, "username")?;

        let mut user = self
            .store
            .get_user(username)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(username.to_owned()))?;
        if user.add_role(role) {
            self.store.update_user(&user).await?;
        }
        Ok(())
    }

    async fn unlink(&self, role: &Role, username: &str) -> DirectoryResult<()> {
        require_key(username, "username")?;

        let mut user = self
            .store
            .get_user(username)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(username.to_owned()))?;
        if user.remove_role(role) {
            self.store.update_user(&user).await?;
        }
        Ok(())
    }
}
