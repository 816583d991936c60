//! `tally` -- habit tracker with streaks, weekly history, and a daily log.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;
mod session;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Tracks whether a Ctrl+C has already been received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

fn main() {
    // First Ctrl+C exits cleanly, a second one forces exit.
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
        std::process::exit(0);
    });

    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);

    if ctx.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("tally=debug,tally_storage=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Some(Commands::Init(args)) => commands::init::run(&ctx, &args),
        Some(Commands::Task(args)) => commands::task::run(&ctx, &args),
        Some(Commands::Done(args)) => commands::mark::run_done(&ctx, &args),
        Some(Commands::Fail(args)) => commands::mark::run_fail(&ctx, &args),
        Some(Commands::Undo(args)) => commands::mark::run_undo(&ctx, &args),
        Some(Commands::Today) => commands::today::run(&ctx),
        Some(Commands::Dashboard) => commands::dashboard::run(&ctx),
        Some(Commands::Streaks) => commands::dashboard::run_streaks(&ctx),
        Some(Commands::History(args)) => commands::history::run(&ctx, &args),
        Some(Commands::Log(args)) => commands::log::run(&ctx, &args),
        Some(Commands::Field(args)) => commands::field::run(&ctx, &args),
        Some(Commands::Export(args)) => commands::export::run(&ctx, &args),
        Some(Commands::Config(args)) => commands::config_cmd::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
