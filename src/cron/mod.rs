//! Cron scheduler for periodic background tasks.
//!
//! Runs jobs like:
//! - Appending a price snapshot for every configured collection

pub mod jobs;
mod scheduler;

pub use jobs::update_price_data::PriceFeeds;
pub use scheduler::{CronScheduler, CronSettings};
