//! Configuration for the folio server
//!
//! CLI arguments with environment variable fallbacks, using clap.

use crate::errors::{PersistError, PersistResult};
use crate::gateway::GatewayConfig;
use crate::github::GitHubStore;
use crate::local::LocalFileStore;
use crate::rate_limit::{RateLimiter, ADMIN_SAVE_KEY};
use crate::store::ContentStore;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where committed content is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// `site.<locale>.json` files in the content directory
    Local,
    /// Files in a GitHub repository, guarded by their blob sha
    Github,
}

/// folio-server - save gateway for the site content editor
#[derive(Parser, Debug, Clone)]
#[command(name = "folio-server")]
#[command(about = "Content save gateway for the folio admin editor")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "FOLIO_LISTEN", default_value = "127.0.0.1:3030")]
    pub listen: SocketAddr,

    /// Directory holding site.<locale>.json in local mode
    #[arg(long, env = "FOLIO_CONTENT_DIR", default_value = "content")]
    pub content_dir: PathBuf,

    #[arg(long, env = "FOLIO_MODE", value_enum, default_value = "local")]
    pub mode: Mode,

    /// GitHub token with contents write access
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPO")]
    pub github_repo: Option<String>,

    #[arg(long, env = "GITHUB_BRANCH", default_value = "main")]
    pub github_branch: String,

    /// Saves accepted per window
    #[arg(long, env = "FOLIO_RATE_LIMIT_MAX", default_value = "5")]
    pub rate_limit_max: usize,

    #[arg(long, env = "FOLIO_RATE_LIMIT_WINDOW_SECS", default_value = "60")]
    pub rate_limit_window_secs: u64,

    /// Upper bound on one store write
    #[arg(long, env = "FOLIO_COMMIT_TIMEOUT_SECS", default_value = "30")]
    pub commit_timeout_secs: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "FOLIO_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Store for the configured mode. GitHub mode needs a token and a repo.
    pub fn build_store(&self) -> PersistResult<Arc<dyn ContentStore>> {
        match self.mode {
            Mode::Local => Ok(Arc::new(LocalFileStore::new(self.content_dir.clone()))),
            Mode::Github => {
                let (token, repo) = match (&self.github_token, &self.github_repo) {
                    (Some(token), Some(repo)) if !token.is_empty() && !repo.is_empty() => {
                        (token.clone(), repo.clone())
                    }
                    _ => {
                        return Err(PersistError::Config(
                            "github mode requires GITHUB_TOKEN and GITHUB_REPO".to_string(),
                        ))
                    }
                };
                Ok(Arc::new(GitHubStore::new(token, repo, self.github_branch.clone())))
            }
        }
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(
            self.rate_limit_max,
            Duration::from_secs(self.rate_limit_window_secs),
        )
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            rate_limit_key: ADMIN_SAVE_KEY.to_string(),
            commit_timeout: Duration::from_secs(self.commit_timeout_secs),
        }
    }
}
