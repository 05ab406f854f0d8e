//! Alarm Configuration
//!
//! Loads the INI-style config file into immutable per-alarm-type settings,
//! applying hardcoded defaults key by key when values are absent.

mod error;
mod store;

pub use error::ConfigError;
pub use store::{resolve, AlarmSettings, ConfigKey, SectionValues, DEFAULT_CONFIG_PATH};
