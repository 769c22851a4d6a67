mod loader;
mod schema;

pub use loader::{load_from_file, load_from_str, validate, zone_offset, LoadError};
pub use schema::{
    EngineConfig, HousekeepingConfig, MergeConfig, SchedulerConfig, WorkersConfig, ZoneConfig,
};
