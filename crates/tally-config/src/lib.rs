//! Configuration management for tally.
//!
//! This crate handles discovering the `.tally/` project directory and
//! loading `.tally/config.yaml`, layered under `TALLY_*` environment
//! variables.

pub mod config;
pub mod tally_dir;

pub use config::{ConfigError, Result, TallyConfig, load_config, load_env_config, read_config_file, save_config};
pub use tally_dir::{ensure_tally_dir, find_tally_dir, find_tally_dir_or_error};
