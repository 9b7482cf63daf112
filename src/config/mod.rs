//! Client configuration
//!
//! A single YAML file selects the environment and names the environment
//! variables that carry credentials.

mod client_config;
mod validation;

pub use client_config::{ClientConfig, Environment};
pub use validation::{validate_config, validate_config_result, ValidationError, ValidationResult};
