//! `fieldrep search <text>`: one-shot doctor and chemist search.
//!
//! Runs through [`EntitySearchController`] with no debounce and waits for
//! its state to settle.

use std::time::Duration;

use anyhow::{Context, Result, bail};

use fieldrep_core::search::{EntitySearchController, MIN_QUERY_CHARS, SearchConfig, SearchState};

use crate::app::App;

pub async fn cmd_search(app: &App, text: &str) -> Result<()> {
    app.require_login()?;
    if text.trim().chars().count() < MIN_QUERY_CHARS {
        bail!("search text must be at least {MIN_QUERY_CHARS} characters");
    }

    let controller = EntitySearchController::with_config(
        app.api.clone(),
        SearchConfig {
            debounce: Duration::ZERO,
            ..SearchConfig::default()
        },
    );
    let mut rx = controller.subscribe();
    controller.on_query_change(text);

    // Allow a little past the HTTP timeout so a slow backend surfaces as
    // the request's own error.
    let limit = app.config.timeout + Duration::from_secs(1);
    let settled: SearchState = tokio::time::timeout(limit, async {
        rx.wait_for(|s| s.results_visible && !s.loading)
            .await
            .map(|s| (*s).clone())
    })
    .await
    .context("search timed out")?
    .context("search stopped before finishing")?;
    controller.shutdown();

    if let Some(error) = settled.error {
        bail!("search failed: {error}");
    }

    let results = settled.results;
    if results.is_empty() {
        println!("No doctors or chemists match {text:?}.");
        return Ok(());
    }

    for person in results.people() {
        let subtitle = person.subtitle().unwrap_or("");
        println!("{:<8} {:<8} {:<28} {}", person.kind().to_string(), person.id(), person.name(), subtitle);
    }
    println!();
    println!(
        "{} doctor(s), {} chemist(s)",
        results.doctors.len(),
        results.chemists.len()
    );
    Ok(())
}
