// src/config/mod.rs

//! Project file (`ss.json`) handling.
//!
//! Responsibilities:
//! - Define the JSON-backed data model (`model.rs`).
//! - Load and save the project file (`loader.rs`).
//! - Register packages into the persisted registry (`registry.rs`).
//! - Validate registrations (`validate.rs`).
//! - Inspect host manifests for the authoring variant (`manifest.rs`).

pub mod loader;
pub mod manifest;
pub mod model;
pub mod registry;
pub mod validate;

pub use loader::{CONFIG_FILE_NAME, config_path, load, load_from_path, save_to_path};
pub use manifest::{detect_variant, is_typed, module_format};
pub use model::{PackageEntry, PackageRegistration, ProjectFile, ProjectSettings};
pub use registry::ConfigStore;
pub use validate::validate_registration;
