pub mod auth;
pub mod client;
pub mod dashboard;
pub mod render;

pub use crate::domain::model::*;
pub use crate::domain::ports::{ConfigProvider, DashboardApi, TokenStore};
pub use crate::utils::error::Result;
