//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds the global flags and resolves the project
//! directory, configuration, user scope, and database path on demand.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use tally_config::{TallyConfig, find_tally_dir, load_config, load_env_config};
use tally_storage::SqliteStore;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::session::AppState;

/// User scope when nothing else names one.
const FALLBACK_USER: &str = "default";

/// Runtime context passed to every command handler.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Explicit `--db` path.
    pub db_path: Option<PathBuf>,

    /// Explicit `--user` (or `TALLY_USER`).
    pub user: Option<String>,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

/// The discovered project: its `.tally/` directory (if any) and config.
#[derive(Debug)]
pub struct Project {
    pub dir: Option<PathBuf>,
    pub config: TallyConfig,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            db_path: global.db.clone(),
            user: global.user.clone(),
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// The current local time. Task creation days and "today" both read it.
    pub fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    /// Today's local calendar date.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Finds `.tally/` from the working directory and loads its config.
    pub fn project(&self) -> Result<Project> {
        let cwd = env::current_dir().context("failed to get current directory")?;
        match find_tally_dir(&cwd) {
            Some(dir) => {
                let config = load_config(&dir)
                    .with_context(|| format!("failed to load config from {}", dir.display()))?;
                Ok(Project { dir: Some(dir), config })
            }
            None => Ok(Project {
                dir: None,
                config: load_env_config().context("failed to load configuration")?,
            }),
        }
    }

    /// `--user` > config `user` > `$USER` > `"default"`.
    pub fn resolve_user(&self, config: &TallyConfig) -> String {
        resolve_user(self.user.as_deref(), config.user.as_deref())
    }

    /// `--db` > the configured database inside `.tally/`.
    pub fn resolve_db_path(&self, project: &Project) -> Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        let dir = project
            .dir
            .as_deref()
            .context("no .tally directory found (run 'tally init' first, or pass --db)")?;
        Ok(project.config.database_path(dir))
    }

    /// Opens the store and builds the application state for this invocation.
    pub fn open_session(&self) -> Result<AppState<SqliteStore>> {
        let project = self.project()?;
        let db_path = self.resolve_db_path(&project)?;
        let user = self.resolve_user(&project.config);
        debug!(db = %db_path.display(), %user, "opening session");

        let store = open_store(&db_path)?;
        Ok(AppState::new(store, user, project.config.log_tracking))
    }
}

pub fn open_store(path: &Path) -> Result<SqliteStore> {
    SqliteStore::open(path).with_context(|| format!("failed to open database: {}", path.display()))
}

fn resolve_user(flag: Option<&str>, configured: Option<&str>) -> String {
    let from_env = env::var("USER").or_else(|_| env::var("USERNAME")).ok();
    [flag, configured, from_env.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|u| !u.is_empty())
        .unwrap_or(FALLBACK_USER)
        .to_string()
}
