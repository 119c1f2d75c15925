pub mod browser;
pub mod download;
pub mod feed;
pub mod query;
pub mod repository;

pub use crate::domain::model::{CmisItem, CmisProperty, QueryType};
pub use crate::domain::ports::{ConnectionSettings, FeedSource, Storage};
pub use crate::utils::error::Result;
