//! Runtime configuration - command-line flags with environment fallbacks

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use url::Url;

use crate::backend::{Backend, SupabaseClient, SupabaseConfig};
use crate::db::LocalBackend;
use crate::session::FileSessionStore;

pub const DEFAULT_DB_PATH: &str = "fittrack.db";
pub const DEFAULT_SESSION_PATH: &str = "fittrack_session.json";
pub const DEFAULT_LOG_PATH: &str = "fittrack.log";

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Hosted backend URL
    #[arg(long, env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<Url>,

    /// Hosted backend public (anon) key
    #[arg(long, env = "SUPABASE_ANON_KEY", global = true, hide_env_values = true)]
    pub supabase_anon_key: Option<String>,

    /// Use the embedded SQLite database at this path instead
    #[arg(long = "local", env = "FITTRACK_LOCAL_DB", global = true)]
    pub local_db: Option<PathBuf>,

    /// Embedded backend: new accounts must confirm their email first
    #[arg(long, env = "FITTRACK_REQUIRE_CONFIRMATION", global = true)]
    pub require_confirmation: bool,

    /// Where the signed-in session is kept
    #[arg(long, env = "FITTRACK_SESSION", default_value = DEFAULT_SESSION_PATH, global = true)]
    pub session_file: PathBuf,

    /// HTTP request timeout in seconds
    #[arg(long, env = "FITTRACK_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Log file used while the dashboard owns the terminal
    #[arg(long, env = "FITTRACK_LOG", default_value = DEFAULT_LOG_PATH, global = true)]
    pub log_file: PathBuf,
}

/// Where tracing output goes
#[derive(Debug, Clone, PartialEq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Which backend the settings select
#[derive(Debug, Clone, PartialEq)]
pub enum BackendChoice {
    Remote(Url, String),
    Local(PathBuf),
}

impl Settings {
    /// An explicit local path wins; otherwise complete remote coordinates;
    /// otherwise the default local database.
    pub fn backend_choice(&self) -> BackendChoice {
        if let Some(path) = &self.local_db {
            return BackendChoice::Local(path.clone());
        }
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) if !key.is_empty() => {
                BackendChoice::Remote(url.clone(), key.clone())
            }
            _ => BackendChoice::Local(PathBuf::from(DEFAULT_DB_PATH)),
        }
    }

    /// The dashboard draws on the terminal, so its logs go to the log file
    pub fn log_target(&self, interactive: bool) -> LogTarget {
        if interactive {
            LogTarget::File(self.log_file.clone())
        } else {
            LogTarget::Stderr
        }
    }

    pub fn session_store(&self) -> FileSessionStore {
        FileSessionStore::new(&self.session_file)
    }

    pub fn connect(&self) -> Result<Connection> {
        match self.backend_choice() {
            BackendChoice::Remote(url, key) => {
                info!(%url, "using hosted backend");
                let mut config = SupabaseConfig::new(url, key);
                config.request_timeout = Duration::from_secs(self.timeout_secs);
                let client = SupabaseClient::new(config).context("failed to build HTTP client")?;
                Ok(Connection::Remote(client))
            }
            BackendChoice::Local(path) => {
                info!(path = %path.display(), "using embedded backend");
                let backend = LocalBackend::open(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?
                    .require_email_confirmation(self.require_confirmation);
                Ok(Connection::Local(backend))
            }
        }
    }
}

/// An opened backend
pub enum Connection {
    Remote(SupabaseClient),
    Local(LocalBackend),
}

impl Connection {
    pub fn backend(&self) -> &dyn Backend {
        match self {
            Connection::Remote(client) => client,
            Connection::Local(db) => db,
        }
    }

    /// The embedded backend, for operations only it supports
    pub fn local(&self) -> Option<&LocalBackend> {
        match self {
            Connection::Local(db) => Some(db),
            Connection::Remote(_) => None,
        }
    }
}
