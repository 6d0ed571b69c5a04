//! # Folio Workspace
//!
//! Persistence side of the content editor: storage strategies, the commit
//! gateway in front of them and the HTTP API the admin UI talks to.

pub mod config;
pub mod errors;
pub mod gateway;
pub mod github;
pub mod local;
pub mod memory;
pub mod rate_limit;
pub mod server;
pub mod store;

pub use config::{Args, Mode};
pub use errors::{PersistError, PersistResult};
pub use gateway::{CommitReceipt, GatewayConfig, PersistenceGateway};
pub use github::GitHubStore;
pub use local::LocalFileStore;
pub use memory::{content_version, MemoryStore};
pub use rate_limit::{RateLimiter, ADMIN_SAVE_KEY};
pub use server::{router, ApiError, AppState};
pub use store::{ContentStore, StoreMode, StoredContent, LOCAL_VERSION};
