//! Sequencing of a whole run: rotate logs, announce, run the requested
//! operation kinds in fixed order, report.

use crate::duplicacy::config::DuplicacyConfig;
use crate::duplicacy::executor::ProcessExecutor;
use crate::duplicacy::notifications::RunNotifier;
use crate::duplicacy::result_error::result::Result;
use crate::duplicacy::revision::format_duration;
use crate::duplicacy::run_log::{rotate_log_files, RunLog};
use crate::duplicacy::runner::{OperationRunner, RunContext};
use bon::Builder;
use chrono::Local;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

pub const DEFAULT_LOG_KEEP: usize = 5;

/// Operation kinds requested for one invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunModes {
    pub backup: bool,
    pub copy: bool,
    pub prune: bool,
    pub check: bool,
}

impl RunModes {
    pub fn all() -> Self {
        Self {
            backup: true,
            copy: true,
            prune: true,
            check: true,
        }
    }

    pub fn any(&self) -> bool {
        self.backup || self.copy || self.prune || self.check
    }
}

#[derive(Builder)]
pub struct Orchestrator<'a, E: ProcessExecutor, N: RunNotifier> {
    config: &'a DuplicacyConfig,
    /// Names the run log.
    config_name: &'a str,
    executor: &'a E,
    notifier: &'a N,
    log_dir: &'a Path,
    #[builder(default = DEFAULT_LOG_KEEP)]
    log_keep: usize,
    #[builder(default)]
    log_commands: bool,
}

impl<E: ProcessExecutor, N: RunNotifier> Orchestrator<'_, E, N> {
    /// Runs every requested kind and fills `ctx`. Stops at the first failed
    /// invocation, in which case no success notification is sent and `ctx`
    /// holds the records of the targets that completed before it.
    pub fn run(&self, modes: RunModes, ctx: &mut RunContext) -> Result<()> {
        // Before anything is written, so the previous run's log survives.
        info!("Rotating log files");
        rotate_log_files(self.log_dir, self.config_name, self.log_keep)?;
        let mut log = RunLog::create(self.log_dir, self.config_name)?;

        let start = Instant::now();
        log.message(&format!(
            "Beginning backup on {}",
            Local::now().format("%m-%d-%Y %H:%M:%S")
        ));

        if let Err(e) = self.notifier.notify_start() {
            log.warning(&format!("Failed to send start notification: {e}"));
        }

        let runner = OperationRunner::builder()
            .executor(self.executor)
            .duplicacy_path(self.config.duplicacy_path.as_path())
            .repository(self.config.repository.as_path())
            .log_commands(self.log_commands)
            .build();

        if modes.backup {
            debug!("Running {} backup target(s)", self.config.storage.len());
            runner.run_backups(&self.config.storage, &mut log, ctx)?;
        }
        if modes.copy {
            debug!("Running {} copy target(s)", self.config.copy.len());
            runner.run_copies(&self.config.copy, &mut log, ctx)?;
        }
        if modes.prune {
            debug!("Running {} prune target(s)", self.config.prune.len());
            runner.run_prunes(&self.config.prune, &mut log)?;
        }
        if modes.check {
            debug!("Running {} check target(s)", self.config.check.len());
            runner.run_checks(&self.config.check, &mut log)?;
        }

        let elapsed = start.elapsed();
        log.separator();
        log.message(&format!("Operations completed in {}", format_duration(elapsed)));

        self.notifier.notify_success(ctx, elapsed)
    }
}
