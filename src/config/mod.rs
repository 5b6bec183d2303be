//! Configuration provider

pub mod config;

pub use config::{
    Config, Defaults, EnvironmentConfig, LocaleConfig, UserConfig, CONFIG_DIR_ENV, EXAMPLE_CONFIG,
    LOCAL_CONFIG_FILE,
};
