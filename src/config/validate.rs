// src/config/validate.rs

use crate::config::model::PackageRegistration;
use crate::errors::{Result, SplitscriptError};

/// Check a registration before it is claimed or persisted.
///
/// The unique name becomes a folder under `functions/`, so it must be a
/// single non-empty path segment.
pub fn validate_registration(reg: &PackageRegistration) -> Result<()> {
    validate_unique_name(&reg.unique_name)?;
    validate_patterns(reg)?;
    Ok(())
}

fn validate_unique_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SplitscriptError::ConfigError(
            "package unique name must not be empty".to_string(),
        ));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(SplitscriptError::ConfigError(format!(
            "package unique name '{}' must be a single folder name",
            name
        )));
    }
    Ok(())
}

fn validate_patterns(reg: &PackageRegistration) -> Result<()> {
    for pattern in reg.valid_event_patterns.iter() {
        if pattern.trim().is_empty() {
            return Err(SplitscriptError::ConfigError(format!(
                "package '{}' declares an empty event pattern",
                reg.unique_name
            )));
        }
    }
    Ok(())
}
