pub mod cache;
pub mod capture;
pub mod clock;
pub mod config;
pub mod engine;
pub mod health;
pub mod math;
pub mod merge;
pub mod metrics;
pub mod pool;
pub mod scheduler;
pub mod shutdown;
pub mod statistic;
pub mod store;

pub use engine::Engine;
