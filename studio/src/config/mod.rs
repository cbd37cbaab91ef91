//! Configuration: defaults, validation, loading from the environment.

pub mod app_config;
pub mod validation;

pub use app_config::StudioConfig;
pub use validation::validate_setting;
