//! Run configuration: the repository, the duplicacy binary and the targets of
//! each operation kind.

use crate::duplicacy::notifications::NotificationConfig;
use crate::duplicacy::result_error::error::Error;
use crate::duplicacy::result_error::result::Result;
use crate::duplicacy::result_error::WithMsg;
use crate::duplicacy::validate::{validate_dir_exist, validate_not_blank, validate_shell_words};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fs::File;
use std::path::{Path, PathBuf};
use validator::Validate;

fn default_threads() -> String {
    "1".into()
}

fn default_duplicacy_path() -> PathBuf {
    "duplicacy".into()
}

fn default_true() -> bool {
    true
}

#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate)]
#[serde(deny_unknown_fields)]
pub struct DuplicacyConfig {
    #[validate(custom(function = validate_dir_exist))]
    pub repository: PathBuf,
    #[serde(default = "default_duplicacy_path")]
    pub duplicacy_path: PathBuf,
    #[validate(length(min = 1), nested)]
    pub storage: Vec<BackupInfo>,
    #[serde(default)]
    #[validate(nested)]
    pub copy: Vec<CopyInfo>,
    #[validate(length(min = 1), nested)]
    pub prune: Vec<PruneInfo>,
    #[validate(length(min = 1), nested)]
    pub check: Vec<CheckInfo>,
    #[serde(default)]
    #[validate(nested)]
    pub notifications: Vec<NotificationConfig>,
}

/// One `duplicacy backup` target.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BackupInfo {
    #[validate(custom(function = validate_not_blank))]
    #[builder(into)]
    pub name: String,
    #[serde(default = "default_threads")]
    #[validate(custom(function = validate_not_blank))]
    #[builder(into, default = default_threads())]
    pub threads: String,
    #[serde(default)]
    #[builder(default)]
    pub vss: bool,
    #[builder(into)]
    pub vss_timeout: Option<String>,
    #[validate(custom(function = validate_shell_words))]
    #[builder(into)]
    pub quote: Option<String>,
}

/// One `duplicacy copy` target. `from` is spelled `name` in configuration
/// files written for older releases.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CopyInfo {
    #[serde(alias = "name")]
    #[validate(custom(function = validate_not_blank))]
    #[builder(into)]
    pub from: String,
    #[validate(custom(function = validate_not_blank))]
    #[builder(into)]
    pub to: String,
    #[serde(default = "default_threads")]
    #[validate(custom(function = validate_not_blank))]
    #[builder(into, default = default_threads())]
    pub threads: String,
    #[validate(custom(function = validate_shell_words))]
    #[builder(into)]
    pub quote: Option<String>,
}

/// One `duplicacy prune` target. `keep` holds the raw, space separated
/// retention rules.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PruneInfo {
    #[validate(custom(function = validate_not_blank))]
    #[builder(into)]
    pub storage: String,
    #[validate(custom(function = validate_not_blank))]
    #[builder(into)]
    pub keep: String,
    #[serde(default = "default_threads")]
    #[validate(custom(function = validate_not_blank))]
    #[builder(into, default = default_threads())]
    pub threads: String,
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub all: bool,
    #[validate(custom(function = validate_shell_words))]
    #[builder(into)]
    pub quote: Option<String>,
}

/// One `duplicacy check` target.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CheckInfo {
    #[validate(custom(function = validate_not_blank))]
    #[builder(into)]
    pub storage: String,
    #[serde(default)]
    #[builder(default)]
    pub all: bool,
    #[validate(custom(function = validate_shell_words))]
    #[builder(into)]
    pub quote: Option<String>,
}

impl DuplicacyConfig {
    /// Parses and validates a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = File::open(path)
            .map_err(Error::from)
            .and_then(|f| {
                serde_yml::from_reader::<_, DuplicacyConfig>(f)
                    .map_err(Error::from)
                    .with_msg(format!("Parse YAML config failed: {:?}", path))
            })?;
        config
            .validate()
            .map_err(Error::from)
            .with_msg(format!("Config validation failed: {:?}", path))?;
        Ok(config)
    }

    /// Human readable listing of every configured target.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Backup Information:\n");
        out.push_str(&format!("  Num\t{:<20}{}\n", "Storage", "Threads"));
        for (i, b) in self.storage.iter().enumerate() {
            out.push_str(&format!("  {:>2}\t{:<20}   {}\n", i + 1, b.name, b.threads));
        }
        if !self.copy.is_empty() {
            out.push_str("Copy Information:\n");
            out.push_str(&format!("  Num\t{:<20}{:<20}{}\n", "From", "To", "Threads"));
            for (i, c) in self.copy.iter().enumerate() {
                out.push_str(&format!(
                    "  {:>2}\t{:<20}{:<20}   {}\n",
                    i + 1,
                    c.from,
                    c.to,
                    c.threads
                ));
            }
        }
        out.push_str("Prune Information:\n");
        for (i, p) in self.prune.iter().enumerate() {
            out.push_str(&format!(
                "  {:>2}: Storage {}\n      Keep: {}\n",
                i + 1,
                p.storage,
                p.keep
            ));
        }
        out.push_str("Check Information:\n");
        out.push_str(&format!("  Num\t{:<20}{}\n", "Storage", "All Snapshots"));
        for (i, c) in self.check.iter().enumerate() {
            out.push_str(&format!("  {:>2}\t{:<20}    {}\n", i + 1, c.storage, c.all));
        }
        out
    }
}
