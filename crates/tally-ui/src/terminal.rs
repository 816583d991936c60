//! Terminal detection.

use std::env;

/// Returns `true` if stdout is connected to a terminal.
pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Whether ANSI colors should be emitted.
///
/// `NO_COLOR`, `CLICOLOR=0` and `TERM=dumb` disable color;
/// `CLICOLOR_FORCE` enables it off a TTY. Otherwise color follows
/// [`is_tty`].
pub fn supports_color() -> bool {
    color_policy(
        env::var_os("NO_COLOR").is_some(),
        env::var("CLICOLOR").ok().as_deref(),
        env::var("TERM").ok().as_deref(),
        env::var_os("CLICOLOR_FORCE").is_some(),
    )
    .unwrap_or_else(is_tty)
}

/// Decides color from the environment alone; `None` defers to TTY detection.
fn color_policy(
    no_color: bool,
    clicolor: Option<&str>,
    term: Option<&str>,
    force: bool,
) -> Option<bool> {
    if no_color || clicolor == Some("0") || term == Some("dumb") {
        Some(false)
    } else if force {
        Some(true)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabling_conventions_win_over_force() {
        assert_eq!(color_policy(true, None, None, true), Some(false));
        assert_eq!(color_policy(false, Some("0"), None, true), Some(false));
        assert_eq!(color_policy(false, None, Some("dumb"), true), Some(false));
    }

    #[test]
    fn force_and_fallback() {
        assert_eq!(color_policy(false, Some("1"), Some("xterm"), true), Some(true));
        assert_eq!(color_policy(false, None, Some("xterm-256color"), false), None);
    }
}
