//! Sample users and roles.
//!
//! Ships a ready-made init hook that resets the directory to a small,
//! predictable data set. Useful for demos and for tests that want a
//! populated directory without building one by hand.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::DirectoryResult;
use crate::models::{Role, User};
use crate::service::UserRoleDirectory;
use crate::transaction::InitHook;

const SAMPLE_PASSWORD: &str = "cGFzc3dvcmQ=";

/// Init hook that seeds the sample data set via [`seed_sample_directory`].
pub fn sample_data_hook() -> InitHook {
    Box::new(seed_hook)
}

fn seed_hook(directory: &dyn UserRoleDirectory) -> BoxFuture<'_, DirectoryResult<()>> {
    seed_sample_directory(directory).boxed()
}

/// Replaces the directory contents with the sample roles and users. A
/// non-empty directory is wiped first so seeding is repeatable.
pub async fn seed_sample_directory(directory: &dyn UserRoleDirectory) -> DirectoryResult<()> {
    if !directory.get_users().await?.is_empty() {
        wipe(directory).await?;
    }

    let admin = Role::new("Admin").with_description("Super");
    let administrator = Role::new("Administrator").with_description("Administrator");
    let ceo = Role::new("ceo").with_description("Chief Executive Officer");
    let cto = Role::new("cto").with_description("Chief Technology Officer");
    let dev = Role::new("dev").with_description("Developer");
    let devmgr = Role::new("devmgr").with_description("Development Manager");
    let is = Role::new("is").with_description("Information Services");

    let mut joe = User::new("joe", SAMPLE_PASSWORD);
    joe.add_role(&admin);

    let mut jim = User::new("jim", SAMPLE_PASSWORD);
    jim.add_role(&administrator);
    jim.add_role(&ceo);

    let mut john = User::new("john", SAMPLE_PASSWORD);
    john.add_role(&dev);

    let mut susan = User::new("susan", SAMPLE_PASSWORD);
    susan.add_role(&cto);
    susan.add_role(&is);

    let mut sally = User::new("sally", SAMPLE_PASSWORD);
    sally.add_role(&dev);
    sally.add_role(&devmgr);

    for role in [admin, administrator, ceo, cto, dev, devmgr, is] {
        directory.create_role(role).await?;
    }
    for user in [joe, jim, john, susan, sally] {
        directory.create_user(user).await?;
    }

    tracing::info!("seeded sample users and roles");
    Ok(())
}

async fn wipe(directory: &dyn UserRoleDirectory) -> DirectoryResult<()> {
    for user in directory.get_users().await? {
        directory.delete_user(user.username()).await?;
    }
    for role in directory.get_roles().await? {
        directory.delete_role(role.name()).await?;
    }
    Ok(())
}
