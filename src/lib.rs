pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::args::CliConfig;

pub use app::bootstrap::App;
pub use config::token_store::{FileTokenStore, MemoryTokenStore};
pub use config::ClientConfig;
pub use crate::core::{auth::AuthSession, client::ApiClient, dashboard::Dashboard};
pub use domain::ports::{DashboardApi, TokenStore};
pub use utils::error::{DashError, Result};
