//! `tally config` -- show, get, and set configuration values.

use anyhow::{Context, Result, bail};
use tally_config::{TallyConfig, read_config_file, save_config};

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, print_message};

pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    let project = ctx.project()?;

    match &args.command {
        ConfigCommands::Show => {
            if ctx.json {
                output_json(&project.config)?;
            } else {
                for key in TallyConfig::KEYS {
                    let value = project.config.get(key)?.unwrap_or_default();
                    println!("{key} = {value}");
                }
                println!("user (effective) = {}", ctx.resolve_user(&project.config));
            }
        }

        ConfigCommands::Get(get) => {
            let value = project.config.get(&get.key)?;
            if ctx.json {
                output_json(&serde_json::json!({ "key": get.key, "value": value }))?;
            } else {
                match value {
                    Some(v) => println!("{v}"),
                    None => bail!("'{}' is not set", get.key),
                }
            }
        }

        ConfigCommands::Set(set) => {
            let dir = project
                .dir
                .context("no .tally directory found (run 'tally init' first)")?;
            // Edit the file's own values, not the env-layered view.
            let mut config = read_config_file(&dir)?;
            config.set(&set.key, &set.value)?;
            save_config(&dir, &config).context("failed to write config.yaml")?;

            if ctx.json {
                output_json(&serde_json::json!({ "key": set.key, "value": config.get(&set.key)? }))?;
            } else {
                print_message(ctx, format!("Set {} = {}", set.key, set.value.trim()));
            }
        }
    }
    Ok(())
}
