//! `tally history` -- one week of habits and log entries.

use anyhow::{Result, bail};
use tally_core::dates::long_label;
use tally_core::week_view::{DayDetail, MAX_WEEK_OFFSET, WeekView};
use tally_ui::styles::{render_header, render_mood, render_muted, render_percentage, render_status_icon};

use crate::cli::HistoryArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &HistoryArgs) -> Result<()> {
    let mut app = ctx.open_session()?;
    app.enter_history();
    if !app.navigate_week(args.week) {
        bail!(
            "--week must be between 0 and {MAX_WEEK_OFFSET} (got {}, staying at week {})",
            args.week,
            app.week_offset().get()
        );
    }
    let view = app.week_view(ctx.today())?;

    if ctx.json {
        return output_json(&view);
    }
    print_week(&view);
    Ok(())
}

fn print_week(view: &WeekView) {
    println!("{}", render_header(&format!("Week of {}", view.label)));
    let s = &view.summary;
    if s.days_with_tasks > 0 {
        println!(
            "Average {}  |  {}/{} days at 80%+",
            render_percentage(s.avg_completion),
            s.days_above_80,
            s.days_with_tasks
        );
    }
    if let Some(mood) = s.avg_mood {
        println!("Average mood {mood:.1} over {} logged days", s.days_with_log);
    }

    for day in view.days.iter().filter(|d| !d.is_future) {
        println!();
        print_day(day);
    }

    let mut nav = Vec::new();
    if view.can_go_back {
        nav.push(format!("older: --week {}", view.offset.get() + 1));
    }
    if view.can_go_forward {
        nav.push(format!("newer: --week {}", view.offset.get() - 1));
    }
    if !nav.is_empty() {
        println!();
        println!("{}", render_muted(&nav.join("   ")));
    }
}

fn print_day(day: &DayDetail) {
    let score = if day.total_daily > 0 {
        format!(
            "{}/{} {}",
            day.completed_daily,
            day.total_daily,
            render_percentage(day.completion_percentage)
        )
    } else {
        render_muted("no habits")
    };
    println!("{}  {}", long_label(day.date), score);

    for habit in &day.daily_habits {
        let failed = habit.failure_note.is_some();
        let note = habit
            .failure_note
            .as_deref()
            .map(|n| render_muted(&format!(" ({n})")))
            .unwrap_or_default();
        println!("  {} {}{}", render_status_icon(habit.completed, failed), habit.title, note);
    }
    for title in &day.once_tasks_completed {
        println!("  {} {} {}", render_status_icon(true, false), title, render_muted("(one-time)"));
    }

    if let Some(log) = &day.log {
        if let Some(mood) = log.mood {
            println!("  Mood: {}", render_mood(mood));
        }
        for (name, value) in log.fields.iter() {
            println!("  {name}: {value}");
        }
        if let Some(notes) = &log.notes {
            println!("  Notes: {notes}");
        }
    }
}
