//! `tally field` -- manage custom daily-log fields.

use anyhow::{Context, Result};
use tally_ui::styles::render_muted;

use crate::cli::{FieldArgs, FieldCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table, print_message};

pub fn run(ctx: &RuntimeContext, args: &FieldArgs) -> Result<()> {
    let app = ctx.open_session()?;

    match &args.command {
        FieldCommands::Add(add) => {
            let field = app.add_field(&add.name, add.field_type)?;
            if ctx.json {
                output_json(&field)?;
            } else {
                print_message(
                    ctx,
                    format!("Added {} field {}: {}", field.field_type, field.id, field.name),
                );
            }
        }

        FieldCommands::List => {
            let fields = app.log_fields()?;
            if ctx.json {
                output_json(&fields)?;
            } else if fields.is_empty() {
                println!("{}", render_muted("No log fields. Add one with `tally field add <name>`."));
            } else {
                let rows: Vec<Vec<String>> = fields
                    .iter()
                    .enumerate()
                    .map(|(pos, f)| {
                        vec![
                            (pos + 1).to_string(),
                            f.id.to_string(),
                            f.name.clone(),
                            f.field_type.to_string(),
                        ]
                    })
                    .collect();
                output_table(&["#", "ID", "NAME", "TYPE"], &rows);
            }
        }

        FieldCommands::Remove(remove) => {
            app.remove_field(remove.id)?;
            if ctx.json {
                output_json(&serde_json::json!({ "removed": remove.id }))?;
            } else {
                print_message(ctx, format!("Removed field {}", remove.id));
            }
        }

        FieldCommands::Move(mv) => {
            let fields = app.log_fields()?;
            let index = fields
                .iter()
                .position(|f| f.id == mv.id)
                .with_context(|| format!("log field {} not found", mv.id))?;
            let moved = app.move_field(index, mv.direction)?;
            if ctx.json {
                output_json(&serde_json::json!({ "id": mv.id, "moved": moved }))?;
            } else if moved {
                print_message(ctx, format!("Moved field {}", mv.id));
            } else {
                print_message(ctx, format!("Field {} is already at the edge", mv.id));
            }
        }
    }
    Ok(())
}
