//! `tally init` -- create `.tally/` with a config file and database.

use std::env;
use std::fs;

use anyhow::{Context, Result, bail};
use tally_config::config::CONFIG_FILE_NAME;
use tally_config::tally_dir::TALLY_DIR_NAME;
use tally_config::{TallyConfig, ensure_tally_dir, save_config};
use tally_storage::Storage;

use crate::cli::InitArgs;
use crate::context::{RuntimeContext, open_store};
use crate::output::{output_json, print_message};

const GITIGNORE_CONTENT: &str = "# tally database files
*.db
*.db-journal
*.db-wal
*.db-shm
";

pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    let existing = cwd.join(TALLY_DIR_NAME).join(CONFIG_FILE_NAME);
    if existing.exists() && !args.force {
        bail!(
            "tally is already initialized in {}\n\
             Use --force to rewrite the configuration (data is kept).",
            cwd.display()
        );
    }

    let tally_dir = ensure_tally_dir(&cwd)
        .with_context(|| format!("failed to create {}", cwd.join(TALLY_DIR_NAME).display()))?;

    let config = TallyConfig {
        user: args
            .default_user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
        log_tracking: !args.no_log,
        ..TallyConfig::default()
    };
    save_config(&tally_dir, &config).context("failed to write config.yaml")?;

    let gitignore = tally_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, GITIGNORE_CONTENT)
            .with_context(|| format!("failed to create {}", gitignore.display()))?;
    }

    let db_path = ctx
        .db_path
        .clone()
        .unwrap_or_else(|| config.database_path(&tally_dir));
    let store = open_store(&db_path)?;
    store.close()?;

    if ctx.json {
        output_json(&serde_json::json!({
            "tally_dir": tally_dir,
            "database": db_path,
            "user": config.user,
            "log_tracking": config.log_tracking,
        }))?;
    } else {
        print_message(ctx, format!("Initialized tally in {}", tally_dir.display()));
        print_message(ctx, format!("  Database: {}", db_path.display()));
        if !config.log_tracking {
            print_message(ctx, "  Daily log: disabled");
        }
        print_message(ctx, "Run `tally task add \"Drink water\"` to get started.");
    }
    Ok(())
}
