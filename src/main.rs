//! AgentStudio - plugin marketplace manager
//!
//! Thin CLI over the library: resolves the home directory and active
//! engine once, then dispatches to the command implementations.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use agentstudio::cli::{Cli, Commands};
use agentstudio::commands::{self, Context};
use agentstudio::engine::{Engine, EngineConfig};
use agentstudio::error::Result;
use agentstudio::paths::PathResolver;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "agentstudio=debug"
    } else {
        "agentstudio=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_context(cli: &Cli) -> Result<Context> {
    let paths = match &cli.home {
        Some(home) => PathResolver::new(home.clone()),
        None => PathResolver::from_env()?,
    };
    let engine = match cli.engine.as_deref().and_then(Engine::parse) {
        Some(engine) => EngineConfig::resolve(&paths, engine),
        None => EngineConfig::from_env(&paths),
    };
    Ok(Context { paths, engine })
}

fn run(cli: Cli) -> Result<()> {
    let ctx = resolve_context(&cli)?;
    match cli.command {
        Commands::Add(args) => commands::marketplace::add(&ctx, args),
        Commands::Remove(args) => commands::marketplace::remove(&ctx, args),
        Commands::Sync(args) => commands::marketplace::sync(&ctx, args),
        Commands::Check(args) => commands::marketplace::check(&ctx, args),
        Commands::List(args) => commands::marketplace::list(&ctx, args),
        Commands::Install(args) => commands::plugin::install(&ctx, args),
        Commands::Uninstall(args) => commands::plugin::uninstall(&ctx, args),
        Commands::Enable(args) => commands::plugin::enable(&ctx, args),
        Commands::Disable(args) => commands::plugin::disable(&ctx, args),
        Commands::Resync(args) => commands::resync::resync(&ctx, args),
        Commands::Status => commands::resync::status(&ctx),
        Commands::ImportAgents(args) => commands::marketplace::import_agents(&ctx, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
