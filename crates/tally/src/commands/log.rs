//! `tally log` -- the daily log: mood, notes, and custom fields.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tally_core::daily_log::{LogField, Mood};
use tally_core::dates::long_label;
use tally_core::week_view::DayLog;
use tally_ui::styles::{render_header, render_mood, render_muted};

use crate::cli::{LogArgs, LogCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, print_message};

/// `log show --json` payload. Field values keep display order.
#[derive(Serialize)]
struct LogShow<'a> {
    date: NaiveDate,
    log: Option<&'a DayLog>,
}

pub fn run(ctx: &RuntimeContext, args: &LogArgs) -> Result<()> {
    let app = ctx.open_session()?;

    match &args.command {
        LogCommands::Show(show) => {
            let date = show.date.unwrap_or_else(|| ctx.today());
            let fields = app.log_fields()?;
            let log = app.daily_log(date)?.map(|l| DayLog::from_log(&l, &fields));

            if ctx.json {
                output_json(&LogShow { date, log: log.as_ref() })?;
                return Ok(());
            }
            println!("{}", render_header(&long_label(date)));
            match log {
                None => println!("{}", render_muted("Nothing logged.")),
                Some(log) => {
                    let mood = log.mood.map(render_mood).unwrap_or_else(|| render_muted("-"));
                    println!("Mood:  {mood}");
                    for field in &fields {
                        let value = log
                            .fields
                            .get(&field.name)
                            .cloned()
                            .unwrap_or_else(|| render_muted("-"));
                        println!("{}: {value}", field.name);
                    }
                    if let Some(notes) = &log.notes {
                        println!("Notes: {notes}");
                    }
                }
            }
        }

        LogCommands::Mood(mood_args) => {
            let date = mood_args.date.unwrap_or_else(|| ctx.today());
            let mood = if mood_args.clear {
                None
            } else {
                let value = mood_args.mood.context("a mood from 1 to 5 is required")?;
                Some(Mood::new(value)?)
            };
            let log = app.set_mood(date, mood)?;
            if ctx.json {
                output_json(&log)?;
            } else {
                match mood {
                    Some(mood) => print_message(ctx, format!("Mood for {date}: {}", render_mood(mood))),
                    None => print_message(ctx, format!("Cleared mood for {date}")),
                }
            }
        }

        LogCommands::Notes(notes_args) => {
            let date = notes_args.date.unwrap_or_else(|| ctx.today());
            let log = app.set_notes(date, &notes_args.notes)?;
            if ctx.json {
                output_json(&log)?;
            } else if log.notes.is_some() {
                print_message(ctx, format!("Saved notes for {date}"));
            } else {
                print_message(ctx, format!("Cleared notes for {date}"));
            }
        }

        LogCommands::Set(set) => {
            let date = set.date.unwrap_or_else(|| ctx.today());
            let fields = app.log_fields()?;
            let field = find_field(&fields, &set.field)?;
            let entry = app.set_field_value(date, field.id, &set.value)?;
            if ctx.json {
                output_json(&entry)?;
            } else {
                match entry {
                    Some(e) => print_message(ctx, format!("{} for {date}: {}", field.name, e.value)),
                    None => print_message(ctx, "Empty value; nothing written."),
                }
            }
        }
    }
    Ok(())
}

/// Looks a field up by ID, then by case-insensitive name.
fn find_field<'a>(fields: &'a [LogField], key: &str) -> Result<&'a LogField> {
    let key = key.trim();
    let by_id = key.parse::<i64>().ok().and_then(|id| fields.iter().find(|f| f.id == id));
    by_id
        .or_else(|| fields.iter().find(|f| f.name.eq_ignore_ascii_case(key)))
        .with_context(|| format!("no active log field named '{key}' (see `tally field list`)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::enums::FieldType;

    fn field(id: i64, name: &str) -> LogField {
        LogField {
            id,
            user: "alice".into(),
            name: name.into(),
            field_type: FieldType::Text,
            display_order: id,
            is_active: true,
        }
    }

    #[test]
    fn finds_by_id_then_name() {
        let fields = vec![field(1, "Sleep"), field(2, "Steps")];
        assert_eq!(find_field(&fields, "2").unwrap().name, "Steps");
        assert_eq!(find_field(&fields, " sleep ").unwrap().id, 1);
        assert!(find_field(&fields, "Water").is_err());
    }
}
