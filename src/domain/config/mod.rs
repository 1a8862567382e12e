//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, Settings, Timeouts, DEFAULT_BUNDLE_IDENTIFIER, DEFAULT_BUNDLE_NAME,
    DEFAULT_CODESIGN_PATH, DEFAULT_LSREGISTER_PATH,
};
