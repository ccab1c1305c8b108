use anyhow::{Context, Result};
use colored::Colorize;

use sinoscript_application::Portal;
use sinoscript_application::pages::LoginPage;

use crate::prompt::read_line;

pub async fn login(portal: &Portal, email: &str, password: Option<String>) -> Result<()> {
    if !portal.is_online() {
        println!(
            "{}",
            "No remote catalogue configured; working offline, sign-in is not needed.".yellow()
        );
        return Ok(());
    }

    let password = match password {
        Some(password) => password,
        None => read_line("Password: ").context("No password given")?,
    };

    let user = LoginPage::new(portal.auth.as_ref(), &portal.navigator)
        .submit(email, &password)
        .await
        .context("Sign-in failed")?;
    println!(
        "{} Signed in as {}",
        "✓".green(),
        user.email.as_deref().unwrap_or(&user.id).bold()
    );
    Ok(())
}

pub async fn logout(portal: &Portal) -> Result<()> {
    LoginPage::new(portal.auth.as_ref(), &portal.navigator)
        .sign_out()
        .await
        .context("Sign-out failed")?;
    println!("{} Signed out", "✓".green());
    Ok(())
}
