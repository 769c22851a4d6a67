use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub housekeeping: HousekeepingConfig,
    #[serde(default)]
    pub workers: WorkersConfig,
    #[serde(default)]
    pub zone: ZoneConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_fixed_delay_ms")]
    pub fixed_delay_ms: u64,
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MergeConfig {
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HousekeepingConfig {
    #[serde(default = "default_bucket_threshold")]
    pub bucket_threshold: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkersConfig {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct ZoneConfig {
    #[serde(default)]
    pub utc_offset_seconds: i32,
}

impl SchedulerConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn fixed_delay(&self) -> Duration {
        Duration::from_millis(self.fixed_delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl MergeConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            past_days: default_past_days(),
            scheduler: SchedulerConfig::default(),
            merge: MergeConfig::default(),
            housekeeping: HousekeepingConfig::default(),
            workers: WorkersConfig::default(),
            zone: ZoneConfig::default(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            fixed_delay_ms: default_fixed_delay_ms(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: default_chunk_size(),
            wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            bucket_threshold: default_bucket_threshold(),
        }
    }
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_past_days() -> u32 {
    30
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_fixed_delay_ms() -> u64 {
    1000
}

fn default_shutdown_grace_secs() -> u64 {
    60
}

fn default_chunk_size() -> usize {
    10
}

fn default_wait_timeout_ms() -> u64 {
    200
}

fn default_bucket_threshold() -> usize {
    200
}

fn default_max_workers() -> usize {
    20
}

fn default_queue_capacity() -> usize {
    3000
}
