use anyhow::{bail, Context};

use crate::auth::ensure_superuser;
use crate::cli::utils::open_store;
use crate::config::AppConfig;

pub async fn handle(
    config: &AppConfig,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let mut superuser = config.superuser.clone();
    if let Some(username) = username {
        superuser.username = username;
    }
    if let Some(email) = email {
        superuser.email = email;
    }
    if let Some(password) = password {
        superuser.password = password;
    }
    if superuser.password.is_empty() {
        bail!("no superuser password given (use --password or SUPERUSER_PASSWORD)");
    }

    let store = open_store(config, false).await?;
    let created = ensure_superuser(store.as_ref(), &superuser, config.security.bcrypt_cost)
        .await
        .context("failed to create superuser")?;

    match created {
        Some(user) => println!("✓ Superuser created: {} (id {})", user.username, user.id),
        None => println!("✓ Superuser {} already exists", superuser.username),
    }
    Ok(())
}
