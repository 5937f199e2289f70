//! Plain text rendering of a run for notifications.

use crate::duplicacy::result_error::error::Error;
use crate::duplicacy::revision::format_duration;
use crate::duplicacy::runner::RunContext;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub enum Outcome<'a> {
    Started,
    Succeeded(Duration),
    Failed(&'a Error),
}

pub struct RunReport<'a> {
    config_name: &'a str,
    ctx: Option<&'a RunContext>,
    outcome: Outcome<'a>,
}

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

impl<'a> RunReport<'a> {
    pub fn new(config_name: &'a str, ctx: Option<&'a RunContext>, outcome: Outcome<'a>) -> Self {
        Self {
            config_name,
            ctx,
            outcome,
        }
    }

    pub fn topic(&self) -> String {
        let status = match self.outcome {
            Outcome::Started => "started",
            Outcome::Succeeded(_) => "succeeded",
            Outcome::Failed(_) => "FAILED",
        };
        format!("{} backup {}", self.config_name, status)
    }

    fn write_tables(&self, f: &mut Formatter<'_>, ctx: &RunContext) -> std::fmt::Result {
        if !ctx.backup_table().is_empty() {
            writeln!(f)?;
            writeln!(f, "Backups:")?;
            writeln!(
                f,
                "  {:<16} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  {}",
                "Storage",
                "Files",
                "Size",
                "New files",
                "New size",
                "Chunks",
                "Size",
                "New chunks",
                "New size",
                "Uploaded",
                "Duration"
            )?;
            for rev in ctx.backup_table() {
                let s = rev.stats();
                writeln!(
                    f,
                    "  {:<16} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  {}",
                    rev.storage(),
                    cell(s.files_total_count()),
                    cell(s.files_total_size()),
                    cell(s.files_new_count()),
                    cell(s.files_new_size()),
                    cell(s.chunk_total_count()),
                    cell(s.chunk_total_size()),
                    cell(s.chunk_new_count()),
                    cell(s.chunk_new_size()),
                    cell(s.chunk_new_uploaded()),
                    rev.duration_display()
                )?;
            }
        }

        if !ctx.copy_table().is_empty() {
            writeln!(f)?;
            writeln!(f, "Copies:")?;
            writeln!(
                f,
                "  {:<16} {:<16} {:>10} {:>10} {:>10}  {}",
                "From", "To", "Chunks", "Copied", "Skipped", "Duration"
            )?;
            for rev in ctx.copy_table() {
                let s = rev.stats();
                writeln!(
                    f,
                    "  {:<16} {:<16} {:>10} {:>10} {:>10}  {}",
                    rev.storage_from(),
                    rev.storage_to(),
                    cell(s.chunk_total_count()),
                    cell(s.chunk_copy_count()),
                    cell(s.chunk_skip_count()),
                    rev.duration_display()
                )?;
            }
        }
        Ok(())
    }
}

impl Display for RunReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.outcome {
            Outcome::Started => writeln!(
                f,
                "Backup of {} started on {}",
                self.config_name,
                chrono::Local::now().format("%m-%d-%Y %H:%M:%S")
            )?,
            Outcome::Succeeded(elapsed) => writeln!(
                f,
                "Backup of {} completed in {}",
                self.config_name,
                format_duration(elapsed)
            )?,
            Outcome::Failed(error) => {
                writeln!(f, "Backup of {} FAILED:", self.config_name)?;
                let detail = indent::indent_all_with("  ", error.to_string());
                writeln!(f, "{}", detail.trim_end())?;
            }
        }

        match self.ctx {
            Some(ctx) => self.write_tables(f, ctx),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicacy::classify::classify;
    use crate::duplicacy::revision::{BackupStats, CopyStats, RevisionAccumulator};

    fn ctx_with_tables() -> RunContext {
        let mut backup = RevisionAccumulator::<BackupStats>::new();
        backup.record(&classify("Files: 100 total, 10G bytes; 5 new, 200M bytes"));
        let mut copy = RevisionAccumulator::<CopyStats>::new();
        copy.record(&classify(
            "Copy complete, 107 total chunks, 3 chunks copied, 104 skipped",
        ));

        let mut ctx = RunContext::new();
        ctx.push_backup(backup.finish("primary".into(), Duration::from_secs(61)));
        ctx.push_copy(copy.finish(("primary".into(), "offsite".into()), Duration::from_secs(2)));
        ctx
    }

    #[test]
    fn test_topics() {
        let err = Error::SmtpSendError("x".into());
        assert_eq!(
            RunReport::new("nightly", None, Outcome::Started).topic(),
            "nightly backup started"
        );
        assert_eq!(
            RunReport::new("nightly", None, Outcome::Succeeded(Duration::ZERO)).topic(),
            "nightly backup succeeded"
        );
        assert_eq!(
            RunReport::new("nightly", None, Outcome::Failed(&err)).topic(),
            "nightly backup FAILED"
        );
    }

    #[test]
    fn test_success_body_lists_tables() {
        let ctx = ctx_with_tables();
        let body = RunReport::new("nightly", Some(&ctx), Outcome::Succeeded(Duration::from_secs(63)))
            .to_string();

        assert!(body.starts_with("Backup of nightly completed in 1m 3s"));
        let backup_row = body.lines().find(|l| l.trim_start().starts_with("primary ")).unwrap();
        assert!(backup_row.contains("100"));
        assert!(backup_row.contains("200M"));
        assert!(backup_row.contains(" - "));
        assert!(backup_row.ends_with("1m 1s"));
        assert!(body.contains("Copies:"));
        assert!(body.lines().any(|l| l.contains("offsite") && l.contains("104")));
    }

    #[test]
    fn test_failure_body_includes_error() {
        let ctx = RunContext::new();
        let err = Error::SmtpSendError("relay denied".into());
        let body = RunReport::new("nightly", Some(&ctx), Outcome::Failed(&err)).to_string();

        assert!(body.starts_with("Backup of nightly FAILED:"));
        assert!(body.contains("  smtp server rejected message: relay denied"));
        assert!(!body.contains("Backups:"));
    }
}
