// src/lib.rs
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod output;
pub mod process;
pub mod record;
pub mod store;

pub use config::{Settings, TableConfig};
pub use error::ScrapeError;
pub use record::{Column, Record};
