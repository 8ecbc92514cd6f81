//! `fieldrep products`: page through the product catalog.

use anyhow::{Result, bail};

use fieldrep_core::catalog::{CatalogPaginator, LoadOutcome, SkipReason};
use fieldrep_store::models::Product;

use crate::app::App;
use crate::areas_cmd::truncate;

/// Load pages `1..=through` into one list, then print it, optionally
/// filtered by name or code. The filter only sees pages already loaded.
pub async fn cmd_products(app: &App, through: u32, per_page: u32, filter: Option<&str>) -> Result<()> {
    app.require_login()?;

    let paginator = CatalogPaginator::new(app.api.clone(), per_page);
    check(paginator.refresh().await)?;
    while paginator.current_page() < through && paginator.has_more() {
        let before = paginator.current_page();
        match paginator.load_more().await {
            LoadOutcome::Skipped(SkipReason::PastLastPage) => break,
            outcome => check(outcome)?,
        }
        if paginator.current_page() <= before {
            tracing::warn!(page = before + 1, "backend did not advance the page, stopping");
            break;
        }
    }

    let products: Vec<Product> = match filter {
        Some(text) => paginator.filter(text),
        None => paginator.items(),
    };

    if products.is_empty() {
        match filter {
            Some(text) => println!("No loaded products match {text:?}."),
            None => println!("The catalog is empty."),
        }
    } else {
        println!("{:<8} {:<32} {:<12} {:>10}", "ID", "NAME", "CODE", "PRICE");
        println!("{}", "-".repeat(65));
        for product in &products {
            println!(
                "{:<8} {:<32} {:<12} {:>10.2}",
                product.id,
                truncate(&product.name, 32),
                product.code.as_deref().unwrap_or("-"),
                product.price
            );
        }
    }

    println!();
    let last = paginator
        .last_page()
        .map_or_else(|| "?".to_string(), |n| n.to_string());
    println!(
        "{} of {} loaded product(s), pages 1-{} of {}",
        products.len(),
        paginator.len(),
        paginator.current_page(),
        last
    );
    if paginator.has_more() {
        println!("More pages available: pass --page {}.", paginator.current_page() + 1);
    }
    Ok(())
}

fn check(outcome: LoadOutcome) -> Result<()> {
    match outcome {
        LoadOutcome::Loaded { .. } | LoadOutcome::Skipped(_) => Ok(()),
        LoadOutcome::Failed(message) => bail!("failed to load products: {message}"),
    }
}
