//! CLI command implementations.
//!
//! The CLI wires the in-memory store, so every invocation starts cold;
//! embedding applications inject a persistent [`KeyValueStore`] instead.

use std::sync::Arc;

use console::style;

use crate::cache::{KeyValueStore, MemoryStore, TaxonomyCache};
use crate::config::Settings;
use crate::models::CategoryMap;
use crate::refresh::RefreshCoordinator;
use crate::scrapers::{HttpClient, TaxonomyScraper};

fn taxonomy_cache(settings: &Settings) -> Arc<TaxonomyCache> {
    let timeout = std::time::Duration::from_secs(settings.request_timeout);
    let client = HttpClient::with_user_agent(&settings.user_agent, timeout);
    let scraper = TaxonomyScraper::new(client, settings.base_url.clone());
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    Arc::new(TaxonomyCache::new(
        store,
        Arc::new(scraper),
        settings.cache_ttl(),
    ))
}

/// Entries sorted numerically where ids are numeric, lexically otherwise.
fn sorted_entries(map: &CategoryMap) -> Vec<(&String, &String)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    entries
}

fn print_entries(map: &CategoryMap) {
    for (id, label) in sorted_entries(map) {
        println!("{:>10}  {}", style(id).cyan(), label);
    }
}

pub async fn categories(settings: &Settings, refresh: bool) -> anyhow::Result<()> {
    let cache = taxonomy_cache(settings);

    let categories = if refresh {
        let coordinator = RefreshCoordinator::new(cache, settings.refresh_interval());
        coordinator.force_refresh().await.categories
    } else {
        cache.get_categories().await
    };

    print_entries(&categories);
    println!(
        "\n{} categories",
        style(categories.len()).bold()
    );
    Ok(())
}

pub async fn subcategories(settings: &Settings, category_id: &str) -> anyhow::Result<()> {
    let cache = taxonomy_cache(settings);
    let subcategories = cache.get_subcategories(category_id).await;

    if subcategories.is_empty() {
        println!(
            "{}",
            style(format!("No subcategories found for category {}", category_id)).dim()
        );
        return Ok(());
    }

    print_entries(&subcategories);
    println!("\n{} subcategories", style(subcategories.len()).bold());
    Ok(())
}

pub async fn refresh(settings: &Settings, check: bool) -> anyhow::Result<()> {
    let cache = taxonomy_cache(settings);
    let coordinator = RefreshCoordinator::new(cache, settings.refresh_interval());

    if check {
        if coordinator.check().await {
            println!("{}", style("Taxonomy refreshed").green());
        } else {
            println!("{}", style("Refresh not due").dim());
        }
        return Ok(());
    }

    let outcome = coordinator.force_refresh().await;
    println!(
        "{} {} categories",
        style("Refreshed").green(),
        style(outcome.count).bold()
    );
    Ok(())
}

pub fn show_config(settings: &Settings) -> anyhow::Result<()> {
    println!("base_url            = {}", settings.base_url);
    println!("user_agent          = {}", settings.user_agent);
    println!("request_timeout     = {}s", settings.request_timeout);
    println!("category_cache_days = {}", settings.category_cache_days);
    println!("default_shipping    = {}", settings.default_shipping.as_str());
    println!("description_prefix  = {:?}", settings.description_prefix);
    println!("description_suffix  = {:?}", settings.description_suffix);
    println!(
        "username            = {}",
        settings.username.as_deref().unwrap_or("(not set)")
    );
    println!(
        "password            = {}",
        if settings.password.is_some() {
            "********"
        } else {
            "(not set)"
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_entries_numeric_before_slugs() {
        let map: CategoryMap = [
            ("10".to_string(), "Audio".to_string()),
            ("2".to_string(), "Motoren".to_string()),
            ("autos".to_string(), "Auto's".to_string()),
        ]
        .into_iter()
        .collect();

        let ids: Vec<&str> = sorted_entries(&map)
            .into_iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "10", "autos"]);
    }
}
