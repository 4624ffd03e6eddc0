//! Agent login and logout.

use anyhow::Result;
use console::style;
use dialoguer::{Input, Password};

use callkeep_core::{CredentialStore, Settings, login};

pub async fn run_login(settings: &Settings) -> Result<()> {
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;

    let token = login(&settings.api, &email, &password).await?;
    CredentialStore::new().store(&token)?;

    println!("{} Logged in.", style("✓").green());
    Ok(())
}

pub fn run_logout() -> Result<()> {
    CredentialStore::new().clear()?;
    println!("{} Logged out.", style("✓").green());
    Ok(())
}
