//! Plugin install/uninstall and skill enable/disable commands

use console::style;

use crate::cli::plugin::{DisableArgs, EnableArgs, InstallArgs, UninstallArgs};
use crate::commands::Context;
use crate::error::{Result, plugin as plugin_err};
use crate::installer::{self, McpAccumulator};
use crate::parser::{ParsedPlugin, PluginParser};

fn parse_plugin(ctx: &Context, marketplace: &str, plugin: &str) -> Result<ParsedPlugin> {
    let plugin_dir = ctx.paths.marketplace_dir(marketplace).join(plugin);
    if !plugin_dir.is_dir() {
        return Err(plugin_err::not_found(marketplace, plugin));
    }
    PluginParser::new(&ctx.paths).parse_plugin(&plugin_dir, Some(marketplace), Some(plugin))
}

pub fn install(ctx: &Context, args: InstallArgs) -> Result<()> {
    let plugin = parse_plugin(ctx, &args.marketplace, &args.plugin)?;
    let strategy = installer::strategy_for(&ctx.engine);
    let outcome = strategy.install(&plugin, &mut McpAccumulator::default())?;
    println!(
        "{} Installed '{}' from '{}' ({} components)",
        style("✓").green().bold(),
        style(&args.plugin).cyan(),
        args.marketplace,
        outcome.components
    );
    Ok(())
}

pub fn uninstall(ctx: &Context, args: UninstallArgs) -> Result<()> {
    let plugin = parse_plugin(ctx, &args.marketplace, &args.plugin)?;
    let strategy = installer::strategy_for(&ctx.engine);
    strategy.uninstall(&plugin)?;
    println!(
        "{} Uninstalled '{}'",
        style("✓").green().bold(),
        style(&args.plugin).cyan()
    );
    Ok(())
}

pub fn enable(ctx: &Context, args: EnableArgs) -> Result<()> {
    let plugin = parse_plugin(ctx, &args.marketplace, &args.plugin)?;
    let strategy = installer::strategy_for(&ctx.engine);

    if args.all {
        let result = installer::enable_all_skills(strategy.as_ref(), &plugin)?;
        println!(
            "{} Enabled {} skills of '{}'",
            style("✓").green().bold(),
            result.enabled_count,
            style(&args.plugin).cyan()
        );
        return Ok(());
    }

    // clap guarantees a skill name when --all is absent.
    let skill = args.skill.unwrap_or_default();
    installer::enable_skill(strategy.as_ref(), &plugin, &skill)?;
    println!(
        "{} Enabled skill '{}'",
        style("✓").green().bold(),
        style(&skill).cyan()
    );
    Ok(())
}

pub fn disable(ctx: &Context, args: DisableArgs) -> Result<()> {
    let plugin = parse_plugin(ctx, &args.marketplace, &args.plugin)?;
    let strategy = installer::strategy_for(&ctx.engine);
    installer::disable_skill(strategy.as_ref(), &plugin, &args.skill)?;
    println!(
        "{} Disabled skill '{}'",
        style("✓").green().bold(),
        style(&args.skill).cyan()
    );
    Ok(())
}
