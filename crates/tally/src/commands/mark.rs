//! `tally done`, `tally fail`, `tally undo` -- record a task's outcome.

use anyhow::Result;
use tally_core::task::Completion;
use tally_ui::styles::{render_fail, render_muted, render_pass};

use crate::cli::{FailArgs, MarkArgs};
use crate::context::RuntimeContext;
use crate::output::{output_json, print_message};

pub fn run_done(ctx: &RuntimeContext, args: &MarkArgs) -> Result<()> {
    let app = ctx.open_session()?;
    let date = args.date.unwrap_or_else(|| ctx.today());
    let completion = app.mark_complete(args.id, date)?;
    report(ctx, &completion, || {
        render_pass(&format!("Task {} done on {date}", args.id))
    })
}

pub fn run_fail(ctx: &RuntimeContext, args: &FailArgs) -> Result<()> {
    let app = ctx.open_session()?;
    let date = args.date.unwrap_or_else(|| ctx.today());
    let completion = app.mark_failed(args.id, date, &args.note)?;
    report(ctx, &completion, || {
        render_fail(&format!("Task {} failed on {date}", args.id))
    })
}

pub fn run_undo(ctx: &RuntimeContext, args: &MarkArgs) -> Result<()> {
    let app = ctx.open_session()?;
    let date = args.date.unwrap_or_else(|| ctx.today());
    let completion = app.mark_incomplete(args.id, date)?;
    report(ctx, &completion, || {
        render_muted(&format!("Task {} cleared on {date}", args.id))
    })
}

fn report(ctx: &RuntimeContext, completion: &Completion, message: impl FnOnce() -> String) -> Result<()> {
    if ctx.json {
        output_json(completion)
    } else {
        print_message(ctx, message());
        Ok(())
    }
}
