//! `tally task` -- add, list, rename, and archive tasks.

use anyhow::Result;
use tally_core::task::Task;
use tally_ui::styles::render_muted;

use crate::cli::{TaskArgs, TaskCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table, print_message};

pub fn run(ctx: &RuntimeContext, args: &TaskArgs) -> Result<()> {
    let mut app = ctx.open_session()?;

    match &args.command {
        TaskCommands::Add(add) => {
            let task = app.add_task(&add.title, add.task_type, ctx.now().fixed_offset())?;
            if ctx.json {
                output_json(&task)?;
            } else {
                print_message(
                    ctx,
                    format!("Added {} task {}: {}", task.task_type, task.id, task.title),
                );
            }
        }

        TaskCommands::List(list) => {
            let tasks = app.tasks(list.all)?;
            if ctx.json {
                output_json(&tasks)?;
            } else if tasks.is_empty() {
                print_message(ctx, "No tasks yet. Add one with `tally task add <title>`.");
            } else {
                output_table(&["ID", "TYPE", "TITLE", "CREATED"], &task_rows(&tasks));
            }
        }

        TaskCommands::Rename(rename) => {
            let task = app.rename_task(rename.id, &rename.title)?;
            if ctx.json {
                output_json(&task)?;
            } else {
                print_message(ctx, format!("Renamed task {} to: {}", task.id, task.title));
            }
        }

        TaskCommands::Archive(archive) => {
            let task = app.archive_task(archive.id)?;
            if ctx.json {
                output_json(&task)?;
            } else {
                print_message(ctx, format!("Archived task {}: {}", task.id, task.title));
            }
        }
    }
    Ok(())
}

fn task_rows(tasks: &[Task]) -> Vec<Vec<String>> {
    tasks
        .iter()
        .map(|t| {
            let title = if t.is_archived {
                render_muted(&format!("{} (archived)", t.title))
            } else {
                t.title.clone()
            };
            vec![
                t.id.to_string(),
                t.task_type.to_string(),
                title,
                t.created_date().to_string(),
            ]
        })
        .collect()
}
