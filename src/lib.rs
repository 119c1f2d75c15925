pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::PrefsConfig};

pub use crate::core::{browser::CmisBrowser, repository::CmisRepository};
pub use domain::model::{CmisItem, CmisProperty, Favorite, QueryType, Server};
pub use utils::error::{CmisError, Result};
