//! Marketplace lifecycle commands: add, remove, sync, check, list,
//! import-agents

use console::style;

use crate::agents::AgentImporter;
use crate::cli::marketplace::{AddArgs, CheckArgs, ImportAgentsArgs, ListArgs, RemoveArgs, SyncArgs};
use crate::commands::Context;
use crate::error::Result;
use crate::installer;
use crate::marketplace::fetcher::{AddMarketplaceRequest, MarketplaceFetcher};
use crate::marketplace::metadata::{AutoUpdatePolicy, CosConfig};
use crate::parser::PluginParser;

pub fn add(ctx: &Context, args: AddArgs) -> Result<()> {
    let cos_config = if args.cos_bucket.is_some() || args.cos_url.is_some() {
        Some(CosConfig {
            bucket: args.cos_bucket,
            region: args.cos_region,
            path: args.cos_path,
            url: args.cos_url,
        })
    } else {
        None
    };
    let auto_update = args.auto_update.then(|| AutoUpdatePolicy {
        enabled: true,
        check_interval: args.check_interval,
        ..AutoUpdatePolicy::default()
    });

    let fetcher = MarketplaceFetcher::new(&ctx.paths, &ctx.engine);
    let result = fetcher.add_marketplace(&AddMarketplaceRequest {
        name: args.name,
        source_type: args.source_type,
        source: args.source,
        branch: args.branch,
        cos_config,
        auto_update,
    })?;

    println!(
        "{} Added marketplace '{}' ({} plugins, {} agents)",
        style("✓").green().bold(),
        style(&result.name).cyan(),
        result.plugin_count,
        result.agent_count
    );
    Ok(())
}

pub fn remove(ctx: &Context, args: RemoveArgs) -> Result<()> {
    let fetcher = MarketplaceFetcher::new(&ctx.paths, &ctx.engine);
    fetcher.remove_marketplace(&args.name)?;
    println!(
        "{} Removed marketplace '{}'",
        style("✓").green().bold(),
        style(&args.name).cyan()
    );
    Ok(())
}

pub fn sync(ctx: &Context, args: SyncArgs) -> Result<()> {
    let fetcher = MarketplaceFetcher::new(&ctx.paths, &ctx.engine);
    let outcome = fetcher.sync_marketplace(&args.name)?;
    println!(
        "{} Synced marketplace '{}' ({})",
        style("✓").green().bold(),
        style(&outcome.name).cyan(),
        outcome.source_type
    );
    Ok(())
}

pub fn check(ctx: &Context, args: CheckArgs) -> Result<()> {
    let fetcher = MarketplaceFetcher::new(&ctx.paths, &ctx.engine);
    let check = fetcher.check_for_updates(&args.name)?;
    println!("{}", serde_json::to_string_pretty(&check)?);
    Ok(())
}

pub fn list(ctx: &Context, args: ListArgs) -> Result<()> {
    let fetcher = MarketplaceFetcher::new(&ctx.paths, &ctx.engine);

    if let Some(name) = args.name {
        let plugins = fetcher.list_plugins(&name)?;
        if plugins.is_empty() {
            println!("No plugins in '{name}'");
            return Ok(());
        }
        let strategy = installer::strategy_for(&ctx.engine);
        let parser = PluginParser::new(&ctx.paths);
        for plugin_name in plugins {
            let plugin_dir = ctx.paths.marketplace_dir(&name).join(&plugin_name);
            let installed = parser
                .parse_plugin(&plugin_dir, Some(&name), Some(&plugin_name))
                .and_then(|plugin| strategy.is_installed(&plugin))
                .unwrap_or(false);
            if installed {
                println!("{plugin_name}  {}", style("(installed)").green());
            } else {
                println!("{plugin_name}");
            }
        }
        return Ok(());
    }

    let marketplaces = fetcher.list_marketplaces()?;
    if marketplaces.is_empty() {
        println!("No marketplaces registered");
        return Ok(());
    }
    for info in marketplaces {
        println!(
            "{}  {} ({} plugins)",
            style(&info.name).cyan().bold(),
            info.metadata.source_type,
            info.plugin_count
        );
    }
    Ok(())
}

pub fn import_agents(ctx: &Context, args: ImportAgentsArgs) -> Result<()> {
    let importer = AgentImporter::new(&ctx.paths);
    let result = importer.import_agents_from_marketplace(&args.name)?;
    println!(
        "{} Imported {} agents from '{}' ({} skipped)",
        style("✓").green().bold(),
        result.imported,
        style(&args.name).cyan(),
        result.skipped
    );
    Ok(())
}
