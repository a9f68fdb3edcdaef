use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

const PASSWORD_MASK: &str = "[PROTECTED]";

/// A user of the directory. Holds the set of role names the user is a
/// member of.
///
/// Equality and hashing consider the username only. Instances are kept in
/// collections while their membership set mutates, and two users with the
/// same username but different role sets must not coexist in one set.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    username: String,
    /// Opaque credential. Never serialized and never rendered by `Debug`.
    #[serde(skip_serializing)]
    password: String,
    pub description: Option<String>,
    pub enabled: bool,
    roles: HashSet<String>,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            description: None,
            enabled: true,
            roles: HashSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Role names this user is a member of.
    pub fn roles(&self) -> &HashSet<String> {
        &self.roles
    }

    /// Same meaning as a set insert: true if the membership actually changed.
    pub fn add_role(&mut self, role: &Role) -> bool {
        self.roles.insert(role.name().to_owned())
    }

    /// Same meaning as a set remove: true if the membership actually changed.
    pub fn remove_role(&mut self, role: &Role) -> bool {
        self.roles.remove(role.name())
    }

    pub fn clear_roles(&mut self) {
        self.roles.clear();
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.username.hash(state);
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &PASSWORD_MASK)
            .field("description", &self.description)
            .field("enabled", &self.enabled)
            .field("roles", &self.roles)
            .finish()
    }
}

/// A role, also known as an authority. Holds the set of usernames the role
/// is assigned to.
///
/// Equality and hashing consider the name only, for the same reason as
/// [`User`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Role {
    name: String,
    pub description: Option<String>,
    users: HashSet<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            users: HashSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Usernames this role is assigned to.
    pub fn users(&self) -> &HashSet<String> {
        &self.users
    }

    /// Same meaning as a set insert: true if the membership actually changed.
    pub fn add_user(&mut self, user: &User) -> bool {
        self.users.insert(user.username().to_owned())
    }

    /// Same meaning as a set remove: true if the membership actually changed.
    pub fn remove_user(&mut self, user: &User) -> bool {
        self.users.remove(user.username())
    }

    pub fn clear_users(&mut self) {
        self.users.clear();
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Role {}

impl Hash for Role {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_equality_ignores_everything_but_username() {
        let dev = Role::new("dev");

        let mut a = User::new("sally", "secret");
        a.add_role(&dev);

        let b = User::new("sally", "other")
            .with_description("totally different attributes");

        assert_eq!(a, b);

        let c = User::new("suzy", "secret");
        assert_ne!(a, c);
    }

    #[test]
    fn role_equality_ignores_member_set() {
        let mut a = Role::new("dev");
        a.add_user(&User::new("sally", "pw"));

        let b = Role::new("dev").with_description("Developer");
        assert_eq!(a, b);
        assert_ne!(a, Role::new("devmgr"));
    }

    #[test]
    fn users_with_same_key_collapse_in_a_set() {
        let mut set = HashSet::new();
        let mut sally = User::new("sally", "pw");
        set.insert(sally.clone());

        sally.add_role(&Role::new("dev"));
        assert!(!set.insert(sally));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn membership_mutators_report_change() {
        let dev = Role::new("dev");
        let mut user = User::new("sally", "pw");

        assert!(user.add_role(&dev));
        assert!(!user.add_role(&dev));
        assert!(user.remove_role(&dev));
        assert!(!user.remove_role(&dev));

        let mut role = Role::new("dev");
        let sally = User::new("sally", "pw");
        assert!(role.add_user(&sally));
        assert!(!role.add_user(&sally));
        role.clear_users();
        assert!(role.users().is_empty());
    }

    #[test]
    fn debug_output_masks_the_password() {
        let user = User::new("sally", "secret");
        let rendered = format!("{user:?}");

        assert!(rendered.contains("[PROTECTED]"));
        assert!(!rendered.contains("secret"));
    }
}
