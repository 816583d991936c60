//! Output helpers for the `tally` CLI.

use std::io::{self, Write};

use serde::Serialize;

use crate::context::RuntimeContext;

/// Print a value as pretty-printed JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut handle = io::stdout().lock();
    // Ignore broken pipe errors (e.g., piped to `head`)
    let _ = writeln!(handle, "{json}");
    Ok(())
}

/// Prints a confirmation line unless `--quiet`.
pub fn print_message(ctx: &RuntimeContext, message: impl AsRef<str>) {
    if !ctx.quiet {
        println!("{}", message.as_ref());
    }
}

/// Visible width of a cell, ignoring ANSI escape sequences.
pub fn display_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match (in_escape, c) {
            (false, '\u{1b}') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

/// Formats rows under headers with columns padded to their widest cell.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(pad_row(headers.iter().copied(), &widths));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(pad_row(row.iter().map(String::as_str), &widths));
    }
    out.join("\n")
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(display_width(cell));
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    line.join("  ").trim_end().to_string()
}

/// Print a table with headers and rows; nothing when there are no rows.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    println!("{}", format_table(headers, rows));
}
