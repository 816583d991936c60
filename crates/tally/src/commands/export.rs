//! `tally export` -- JSON summary of recent activity for an assistant.

use std::fs;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::cli::ExportArgs;
use crate::context::RuntimeContext;
use crate::output::print_message;

pub fn run(ctx: &RuntimeContext, args: &ExportArgs) -> Result<()> {
    let app = ctx.open_session()?;
    let data = app.export(ctx.today(), Utc::now())?;
    let json = serde_json::to_string_pretty(&data).context("failed to serialize export")?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            print_message(ctx, format!("Exported to {}", path.display()));
        }
        None => println!("{json}"),
    }
    Ok(())
}
