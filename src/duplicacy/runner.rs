//! Operation runners: one pass over the configured targets of one kind.
//!
//! Targets run one after another in configuration order. The first failed
//! invocation stops the pass and is returned untouched; the targets after it
//! are never started.

use crate::duplicacy::classify::{classify, LineClass};
use crate::duplicacy::command::DuplicacyCommand;
use crate::duplicacy::config::{BackupInfo, CheckInfo, CopyInfo, PruneInfo};
use crate::duplicacy::executor::ProcessExecutor;
use crate::duplicacy::result_error::result::Result;
use crate::duplicacy::revision::{
    format_duration, BackupRevision, BackupStats, CopyRevision, CopyStats, RevisionAccumulator,
};
use crate::duplicacy::run_log::RunLog;
use bon::Builder;
use getset::Getters;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const PASSWORD_WARNING: &str =
    "  Error: duplicacy appears to be prompting for a password or rejected the credentials";

/// Result tables of one run. Entries are only ever appended.
#[derive(Clone, Debug, Default, Getters)]
#[getset(get = "pub")]
pub struct RunContext {
    backup_table: Vec<BackupRevision>,
    copy_table: Vec<CopyRevision>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_backup(&mut self, revision: BackupRevision) {
        self.backup_table.push(revision);
    }

    pub(crate) fn push_copy(&mut self, revision: CopyRevision) {
        self.copy_table.push(revision);
    }
}

/// Everything needed to start duplicacy for any target.
#[derive(Builder)]
pub struct OperationRunner<'a, E: ProcessExecutor> {
    executor: &'a E,
    duplicacy_path: &'a Path,
    repository: &'a Path,
    /// Log every command line before running it.
    #[builder(default)]
    log_commands: bool,
}

/// Writes one line of tool output to the run log, echoing summaries and
/// flagging credential prompts on the console.
fn log_output_line(log: &mut RunLog, line: &str, class: &LineClass<'_>) {
    match class {
        LineClass::CredentialPrompt => {
            log.warning(PASSWORD_WARNING);
            log.line(line);
            warn!("  {line}");
        }
        class if class.is_summary() => {
            log.line(line);
            info!("  {line}");
        }
        _ => log.line(line),
    }
}

impl<E: ProcessExecutor> OperationRunner<'_, E> {
    fn invoke<C: DuplicacyCommand>(
        &self,
        target: &C,
        log: &mut RunLog,
        observe: &mut dyn FnMut(&LineClass<'_>),
    ) -> Result<Duration> {
        let start = Instant::now();
        log.separator();
        log.message(&target.describe());

        let args = match target.command_args() {
            Ok(args) => args,
            Err(e) => {
                log.error(&format!("Error building command: {e}"));
                return Err(e);
            }
        };
        if self.log_commands {
            log.message(&format!(
                "Executing: {} {}",
                self.duplicacy_path.display(),
                args.join(" ")
            ));
        }

        let mut sink = |line: &str| {
            let class = classify(line);
            observe(&class);
            log_output_line(log, line, &class);
        };
        if let Err(e) = self
            .executor
            .execute(self.duplicacy_path, &args, self.repository, &mut sink)
        {
            log.error(&format!("Error executing command: {e}"));
            return Err(e);
        }

        let duration = start.elapsed();
        log.message(&format!("  Duration: {}", format_duration(duration)));
        Ok(duration)
    }

    pub fn run_backups(
        &self,
        targets: &[BackupInfo],
        log: &mut RunLog,
        ctx: &mut RunContext,
    ) -> Result<()> {
        for target in targets {
            let mut accumulator = RevisionAccumulator::<BackupStats>::new();
            let duration = self.invoke(target, log, &mut |class: &LineClass<'_>| {
                accumulator.record(class);
            })?;
            ctx.push_backup(accumulator.finish(target.name.clone(), duration));
        }
        Ok(())
    }

    pub fn run_copies(
        &self,
        targets: &[CopyInfo],
        log: &mut RunLog,
        ctx: &mut RunContext,
    ) -> Result<()> {
        for target in targets {
            let mut accumulator = RevisionAccumulator::<CopyStats>::new();
            let duration = self.invoke(target, log, &mut |class: &LineClass<'_>| {
                accumulator.record(class);
            })?;
            ctx.push_copy(accumulator.finish((target.from.clone(), target.to.clone()), duration));
        }
        Ok(())
    }

    pub fn run_prunes(&self, targets: &[PruneInfo], log: &mut RunLog) -> Result<()> {
        for target in targets {
            self.invoke(target, log, &mut |_: &LineClass<'_>| {})?;
        }
        Ok(())
    }

    pub fn run_checks(&self, targets: &[CheckInfo], log: &mut RunLog) -> Result<()> {
        for target in targets {
            self.invoke(target, log, &mut |_: &LineClass<'_>| {})?;
        }
        Ok(())
    }
}
