pub mod aggregation;
pub mod config;
pub mod cron;
pub mod db;
pub mod providers;
pub mod service;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use cron::{CronScheduler, CronSettings, PriceFeeds};
pub use db::Database;
pub use service::{CollectionService, SeriesRequest};
