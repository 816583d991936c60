//! `tally today` -- today's tasks and their state.

use anyhow::Result;
use tally_core::completion_index::TodayTask;
use tally_core::dates::long_label;
use tally_core::enums::TaskType;
use tally_ui::styles::{render_header, render_muted, render_status_icon};

use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let app = ctx.open_session()?;
    let today = ctx.today();
    let tasks = app.today_tasks(today)?;

    if ctx.json {
        return output_json(&serde_json::json!({
            "date": today,
            "tasks": tasks,
        }));
    }

    println!("{}", render_header(&long_label(today)));
    let (daily, once): (Vec<&TodayTask>, Vec<&TodayTask>) =
        tasks.iter().partition(|t| t.task_type == TaskType::Daily);
    print_group("Daily habits", &daily);
    print_group("One-time tasks", &once);
    if tasks.is_empty() {
        println!("{}", render_muted("No tasks yet."));
    }
    Ok(())
}

fn print_group(title: &str, tasks: &[&TodayTask]) {
    if tasks.is_empty() {
        return;
    }
    let done = tasks.iter().filter(|t| t.completed).count();
    println!();
    println!("{title} ({done}/{})", tasks.len());
    for task in tasks {
        println!(
            "  {} {:>3}  {}",
            render_status_icon(task.completed, false),
            task.id,
            task.title
        );
    }
}
