//! `fieldrep login` and `fieldrep logout`.
//!
//! The session (token plus company id) is kept in the persistent store so
//! later invocations reuse it.

use anyhow::{Context, Result};

use fieldrep_core::cache::keys::DAILY_PLAN_KEYS;
use fieldrep_core::session::persist;

use crate::app::App;

// -----------------------------------------------------------------------
// fieldrep login
// -----------------------------------------------------------------------

pub async fn cmd_login(app: &App, email: &str, password: &str) -> Result<()> {
    let session = app
        .api
        .login(email, password)
        .await
        .context("login failed")?;

    persist::save_session(app.store.as_ref(), &session)
        .await
        .context("failed to save session")?;
    // Reference data belongs to whoever was signed in before.
    app.cache().invalidate_all(&DAILY_PLAN_KEYS).await;

    println!("Signed in as {email}.");
    println!();
    println!("  Company: {}", session.company_id.as_deref().unwrap_or("(none)"));
    println!("  Store:   {}", app.store.path().display());
    if !app.session.is_authenticated() {
        println!();
        println!("Warning: the backend returned no company id; most commands will fail.");
    }

    Ok(())
}

// -----------------------------------------------------------------------
// fieldrep logout
// -----------------------------------------------------------------------

pub async fn cmd_logout(app: &App) -> Result<()> {
    let was_signed_in = app.session.token().is_some();

    persist::clear_session(app.store.as_ref())
        .await
        .context("failed to clear saved session")?;
    app.session.logout();
    app.cache().invalidate_all(&DAILY_PLAN_KEYS).await;

    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}
