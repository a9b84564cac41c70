pub mod app_config;
pub mod broadcast;
pub mod memory;

pub use app_config::{Config, SearchRules, ServerConfig};
pub use broadcast::BroadcastSink;
pub use memory::{
    InMemoryBatchRepository, InMemoryFailedCheckRepository, InMemoryPackageRepository,
};
