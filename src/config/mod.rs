// src/config/mod.rs

//! Configuration loading and validation for remotetail.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Merge defaults and validate each server (`validate.rs`).
//! - Select the targets of one run (`targets.rs`).

pub mod loader;
pub mod model;
pub mod targets;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::{
    ConfigFile, ConfigSection, HostTarget, RawConfigFile, RunSettings, ServerSection,
    DEFAULT_QUEUE_CAPACITY,
};
pub use targets::{select_targets, TargetOverrides};
pub use validate::parse_duration;
