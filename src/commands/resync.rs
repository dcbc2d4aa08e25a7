//! Bulk resync and status commands

use crate::cli::resync::ResyncArgs;
use crate::commands::Context;
use crate::error::Result;
use crate::sync_service::BuiltinMarketplaceSyncService;

pub fn resync(ctx: &Context, args: ResyncArgs) -> Result<()> {
    let service = BuiltinMarketplaceSyncService::new(ctx.paths.clone(), ctx.engine.clone());
    let result = service.sync_builtin_marketplaces(&args.paths);
    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

pub fn status(ctx: &Context) -> Result<()> {
    let service = BuiltinMarketplaceSyncService::new(ctx.paths.clone(), ctx.engine.clone());
    let status = service.status();
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
