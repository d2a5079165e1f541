//! Catalog listing and prompt preview

use super::{load_catalog, load_config, load_style, parse_scope};
use anyhow::{Context, Result};
use artpack_core::{AssetSpec, Category};

pub fn run_list(catalog_path: Option<&str>, category: Option<&str>, format: &str) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let scope = parse_scope(category)?;
    let assets: Vec<&AssetSpec> = catalog.in_scope(scope).collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&assets)?);
        return Ok(());
    }

    if assets.is_empty() {
        println!("No assets in {}", scope);
        return Ok(());
    }

    println!("{} asset(s):", assets.len());
    for category in Category::ALL {
        let in_category: Vec<&&AssetSpec> =
            assets.iter().filter(|a| a.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        println!("\n{}", category);
        for asset in in_category {
            println!("  {:<14} {:<28} [{}]", asset.id, asset.name, asset.aspect_ratio);
        }
    }
    Ok(())
}

pub fn run_prompt(catalog_path: Option<&str>, id: &str, style_name: Option<&str>) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let spec = catalog
        .require(id)
        .context("Run `artpack catalog` to list ids")?;

    let config = load_config();
    let style = load_style(style_name, &config);

    println!("{} ({}, {})", spec.name, spec.category, spec.aspect_ratio);
    println!("  Style: {}", style.name);
    println!("  Prompt: {}", style.enrich_prompt(&spec.prompt));
    Ok(())
}
