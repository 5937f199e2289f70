//! Argument lists for single duplicacy invocations.

use crate::duplicacy::config::{BackupInfo, CheckInfo, CopyInfo, PruneInfo};
use crate::duplicacy::result_error::error::Error;
use crate::duplicacy::result_error::result::Result;
use derive_more::Display;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum OperationKind {
    #[display("backup")]
    Backup,
    #[display("copy")]
    Copy,
    #[display("prune")]
    Prune,
    #[display("check")]
    Check,
}

/// A configured target that knows how to turn itself into duplicacy arguments.
pub trait DuplicacyCommand {
    const KIND: OperationKind;

    /// Full argument list, verb first. Fails on malformed passthrough quoting.
    fn command_args(&self) -> Result<Vec<String>>;

    /// One line status message logged before the invocation.
    fn describe(&self) -> String;
}

/// Splits a passthrough flag string into discrete arguments using shell
/// quoting rules, so `-exclude "My Documents"` stays two arguments.
fn quote_args(quote: Option<&str>) -> Result<Vec<String>> {
    match quote {
        None => Ok(vec![]),
        Some(q) => shlex::split(q).ok_or_else(|| Error::InvalidQuote(q.to_owned())),
    }
}

fn quote_suffix(quote: Option<&str>) -> String {
    match quote.map(str::trim) {
        Some(q) if !q.is_empty() => format!(" {q}"),
        _ => String::new(),
    }
}

/// `"7 30 365"` becomes `-keep 7 -keep 30 -keep 365`.
pub fn keep_args(keep: &str) -> Vec<String> {
    keep.split_whitespace()
        .flat_map(|rule| ["-keep".to_string(), rule.to_string()])
        .collect()
}

impl DuplicacyCommand for BackupInfo {
    const KIND: OperationKind = OperationKind::Backup;

    fn command_args(&self) -> Result<Vec<String>> {
        let mut args = vec![
            Self::KIND.to_string(),
            "-storage".into(),
            self.name.clone(),
            "-stats".into(),
            "-threads".into(),
            self.threads.clone(),
        ];
        if self.vss {
            args.push("-vss".into());
            if let Some(timeout) = self.vss_timeout.as_ref().filter(|t| !t.is_empty()) {
                args.push("-vss-timeout".into());
                args.push(timeout.clone());
            }
        }
        args.extend(quote_args(self.quote.as_deref())?);
        Ok(args)
    }

    fn describe(&self) -> String {
        let mut vss = String::new();
        if self.vss {
            vss.push_str(" -vss");
            if let Some(timeout) = self.vss_timeout.as_ref().filter(|t| !t.is_empty()) {
                vss.push_str(&format!(" -vss-timeout {timeout}"));
            }
        }
        format!(
            "Backing up to storage {}{} with {} threads{}",
            self.name,
            vss,
            self.threads,
            quote_suffix(self.quote.as_deref())
        )
    }
}

impl DuplicacyCommand for CopyInfo {
    const KIND: OperationKind = OperationKind::Copy;

    fn command_args(&self) -> Result<Vec<String>> {
        let mut args = vec![
            Self::KIND.to_string(),
            "-from".into(),
            self.from.clone(),
            "-to".into(),
            self.to.clone(),
            "-threads".into(),
            self.threads.clone(),
        ];
        args.extend(quote_args(self.quote.as_deref())?);
        Ok(args)
    }

    fn describe(&self) -> String {
        format!(
            "Copying from storage {} to storage {} with {} threads{}",
            self.from,
            self.to,
            self.threads,
            quote_suffix(self.quote.as_deref())
        )
    }
}

impl DuplicacyCommand for PruneInfo {
    const KIND: OperationKind = OperationKind::Prune;

    fn command_args(&self) -> Result<Vec<String>> {
        let mut args = vec![
            Self::KIND.to_string(),
            "-storage".into(),
            self.storage.clone(),
            "-threads".into(),
            self.threads.clone(),
        ];
        args.extend(keep_args(&self.keep));
        if self.all {
            args.push("-all".into());
        }
        args.extend(quote_args(self.quote.as_deref())?);
        Ok(args)
    }

    fn describe(&self) -> String {
        format!(
            "Pruning storage {} using {} thread(s){}{}",
            self.storage,
            self.threads,
            if self.all { " -all" } else { "" },
            quote_suffix(self.quote.as_deref())
        )
    }
}

impl DuplicacyCommand for CheckInfo {
    const KIND: OperationKind = OperationKind::Check;

    fn command_args(&self) -> Result<Vec<String>> {
        let mut args = vec![Self::KIND.to_string(), "-storage".into(), self.storage.clone()];
        if self.all {
            args.push("-all".into());
        }
        args.extend(quote_args(self.quote.as_deref())?);
        Ok(args)
    }

    fn describe(&self) -> String {
        format!(
            "Checking storage {}{}{}",
            self.storage,
            if self.all { " with -all" } else { "" },
            quote_suffix(self.quote.as_deref())
        )
    }
}
