//! Validation functions for configuration values.
//!
//! Used from `#[validate(custom(...))]` attributes on the configuration types.

use sanitize_filename::{is_sanitized, sanitize};
use validator::ValidationError;

use std::path::Path;

pub fn validate_valid_config_name<S: AsRef<str>>(name: S) -> Result<(), ValidationError> {
    let name = name.as_ref();
    if name.is_empty() || !is_sanitized(name) {
        return Err(ValidationError::new("InvalidConfigName").with_message(
            format!(
                "Invalid configuration name {:?}, try sanitizing like {:?}",
                name,
                sanitize(name)
            )
            .into(),
        ));
    }

    Ok(())
}

pub fn validate_dir_exist<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Err(ValidationError::new("InvalidDirectory")
                .with_message(format!("{:?} is not a directory", dir).into()));
        }
    } else {
        return Err(ValidationError::new("InvalidDirectory")
            .with_message(format!("{:?} not found", dir).into()));
    }

    Ok(())
}

pub fn validate_dir_exist_or_created<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Err(ValidationError::new("InvalidDirectory")
                .with_message(format!("{:?} is not a directory", dir).into()));
        }
    } else {
        return std::fs::create_dir_all(dir).map_err(|e| {
            ValidationError::new("InvalidDirectory").with_message(
                format!("cannot create or access log dir {:?}: {}", dir, e).into(),
            )
        });
    }

    Ok(())
}

pub fn validate_not_blank<S: AsRef<str>>(value: S) -> Result<(), ValidationError> {
    if value.as_ref().trim().is_empty() {
        return Err(ValidationError::new("BlankValue").with_message("must not be blank".into()));
    }

    Ok(())
}

/// Passthrough argument strings must split under shell quoting rules.
pub fn validate_shell_words<S: AsRef<str>>(value: S) -> Result<(), ValidationError> {
    let value = value.as_ref();
    if shlex::split(value).is_none() {
        return Err(ValidationError::new("UnbalancedQuotes")
            .with_message(format!("unbalanced quotes in {:?}", value).into()));
    }

    Ok(())
}
