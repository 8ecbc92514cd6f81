//! `fieldrep areas`: list the representative's working areas.

use anyhow::{Context, Result};

use fieldrep_core::cache::keys::WORKING_AREAS;
use fieldrep_store::models::WorkingArea;

use crate::app::App;

/// Working areas from the reference-data cache, fetched and cached when
/// missing or stale.
pub async fn load_working_areas(app: &App) -> Result<Vec<WorkingArea>> {
    let cache = app.cache();
    if let Some(areas) = cache.get(&WORKING_AREAS).await {
        return Ok(areas);
    }
    let areas = app
        .api
        .working_areas()
        .await
        .context("failed to fetch working areas")?;
    cache.set(&WORKING_AREAS, &areas).await;
    Ok(areas)
}

pub async fn cmd_areas(app: &App) -> Result<()> {
    app.require_login()?;
    let areas = load_working_areas(app).await?;

    if areas.is_empty() {
        println!("No working areas assigned.");
        return Ok(());
    }

    println!("{:<8} {:<28} {:<20} DISTRICT", "ID", "AREA", "CITY");
    println!("{}", "-".repeat(68));
    for area in &areas {
        println!(
            "{:<8} {:<28} {:<20} {}",
            area.id,
            truncate(&area.display_name(), 28),
            truncate(&area.city, 20),
            area.district
        );
    }
    println!();
    println!("{} working area(s)", areas.len());
    Ok(())
}

/// Cut `s` to at most `max` characters, marking the cut with `~`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("Indiranagar", 28), "Indiranagar");
    }

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!(truncate("Koramangala 5th Block", 12), "Koramangala~");
        assert_eq!(truncate("Koramangala 5th Block", 12).chars().count(), 12);
    }
}
