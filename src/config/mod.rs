#[allow(clippy::module_inception)]
mod config;

pub use self::config::{
    CacheSettings, CollectionSettings, PostgresSettings, ProviderSettings, Settings,
};
