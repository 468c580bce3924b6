//! Configuration module for approxcount.
//!
//! Handles named connections, worker location and estimate defaults.

mod settings;

pub use settings::{
    expand_env_vars, ConnectionSettings, EstimateSettings, Settings, SettingsError,
    SettingsResult, WorkerSettings, CONFIG_ENV_VAR,
};
