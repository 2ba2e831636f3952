pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod highlight;
pub mod search;
pub mod storage;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
