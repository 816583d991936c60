//! Command handlers, one module per subcommand group.

pub mod completion;
pub mod config_cmd;
pub mod dashboard;
pub mod export;
pub mod field;
pub mod history;
pub mod init;
pub mod log;
pub mod mark;
pub mod task;
pub mod today;
