//! Login, logout, and account handlers.

use anyhow::Result;
use staffdesk_core::app::AppContext;
use staffdesk_core::auth::AuthService;

pub async fn login(app: &AppContext, email: &str, password: &str) -> Result<()> {
    match app.auth.login(email, password).await {
        Ok(Some(user)) => println!("Logged in as {} ({})", user.email, user.role),
        Ok(None) => println!("Logged in as {email}"),
        Err(err) => {
            tracing::debug!(error = %err, "login failed");
            anyhow::bail!(AuthService::login_error_message(&err));
        }
    }
    Ok(())
}

pub fn logout(app: &AppContext) -> Result<()> {
    app.auth.logout()?;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(app: &AppContext) -> Result<()> {
    if !app.session.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }

    match app.auth.check_auth().await {
        Some(user) => {
            println!("{} <{}>", user.username, user.email);
            println!("role: {}", user.role);
            Ok(())
        }
        None => anyhow::bail!("Session expired. Run `staffdesk login` again."),
    }
}
