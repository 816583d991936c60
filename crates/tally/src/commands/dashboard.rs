//! `tally dashboard` and `tally streaks`.

use anyhow::Result;
use tally_core::dates::short_label;
use tally_core::history::HistoryDay;
use tally_ui::styles::{render_day_cell, render_header, render_muted, render_percentage};

use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let app = ctx.open_session()?;
    let dashboard = app.dashboard(ctx.today())?;

    if ctx.json {
        return output_json(&dashboard);
    }

    println!("{}", render_header("Last 28 days"));
    for week in dashboard.history.chunks(7) {
        println!("{}", week_row(week));
    }
    println!();
    println!(
        "Current streak: {}   Longest streak: {}",
        dashboard.streaks.current, dashboard.streaks.longest
    );
    println!("{}", render_muted("A day counts toward a streak at 80% completion or more."));
    Ok(())
}

pub fn run_streaks(ctx: &RuntimeContext) -> Result<()> {
    let app = ctx.open_session()?;
    let streaks = app.dashboard(ctx.today())?.streaks;

    if ctx.json {
        return output_json(&streaks);
    }
    println!("Current streak: {}", streaks.current);
    println!("Longest streak: {}", streaks.longest);
    Ok(())
}

/// `"Mar 4  ■ ■ · ■ ■ ■ ■  86%"`: the start date, one cell per day, and
/// the week's mean over days that had tasks.
fn week_row(week: &[HistoryDay]) -> String {
    let Some(first) = week.first() else {
        return String::new();
    };
    let cells: Vec<String> = week.iter().map(render_day_cell).collect();
    let scored: Vec<u32> = week
        .iter()
        .filter(|d| !d.is_neutral())
        .map(|d| u32::from(d.percentage))
        .collect();
    let summary = if scored.is_empty() {
        render_muted("--")
    } else {
        let avg = (f64::from(scored.iter().sum::<u32>()) / scored.len() as f64).round() as u8;
        render_percentage(avg)
    };
    format!("{:<7} {}  {}", short_label(first.date), cells.join(" "), summary)
}
