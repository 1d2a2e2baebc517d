//! Models command implementation.

use super::{Format, banner, emit};
use anyhow::{Result, bail};
use ronda_models::registry::{ModelCategory, available_categories, models_by_category};

/// List the registered models, optionally filtered by category.
pub(crate) fn list_models(category: Option<&str>, detailed: bool, format: Format) -> Result<()> {
    let categories: Vec<ModelCategory> = available_categories()
        .into_iter()
        .filter(|cat| {
            category.is_none_or(|filter| {
                cat.to_string()
                    .to_lowercase()
                    .contains(&filter.to_lowercase())
            })
        })
        .collect();
    if categories.is_empty() {
        bail!("no model category matches '{}'", category.unwrap_or_default());
    }

    let models: Vec<_> = categories
        .iter()
        .flat_map(|&cat| models_by_category(cat))
        .collect();

    emit(format, &models, |_| {
        banner("Available Models");
        for cat in &categories {
            println!("{cat}: {}", cat.description());
            println!("{}", "-".repeat(60));
            for info in models_by_category(*cat) {
                if detailed {
                    println!("  {:18} - {}", info.name, info.description);
                    let mut needs = format!("{} period(s) of history", info.min_periods);
                    if info.requires_market_price {
                        needs.push_str(", market price");
                    }
                    println!("  {:18}   needs {needs}", "");
                    if !info.aliases.is_empty() {
                        println!("  {:18}   aliases: {}", "", info.aliases.join(", "));
                    }
                } else {
                    println!("  {}", info.name);
                }
            }
            println!();
        }
    })
}
