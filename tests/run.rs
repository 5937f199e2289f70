use k_duplicacy::duplicacy::config::{BackupInfo, CheckInfo, DuplicacyConfig, PruneInfo};
use k_duplicacy::duplicacy::executor::{LineSink, ProcessExecutor};
use k_duplicacy::duplicacy::notifications::{Notification, Notifications};
use k_duplicacy::duplicacy::orchestrator::{Orchestrator, RunModes};
use k_duplicacy::duplicacy::result_error::error::Error;
use k_duplicacy::duplicacy::result_error::result::Result;
use k_duplicacy::duplicacy::run_log::log_file_path;
use k_duplicacy::duplicacy::runner::{RunContext, PASSWORD_WARNING};
use std::cell::RefCell;
use std::fmt::Display;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tempfile::TempDir;

/// Prints a files and chunks summary for every backup; fails the storage named
/// in `fail_storage`.
struct FakeDuplicacy {
    fail_storage: Option<&'static str>,
    extra_lines: Vec<&'static str>,
    invoked: RefCell<Vec<String>>,
}

impl FakeDuplicacy {
    fn new(fail_storage: Option<&'static str>) -> Self {
        Self {
            fail_storage,
            extra_lines: vec![],
            invoked: RefCell::default(),
        }
    }
}

impl ProcessExecutor for FakeDuplicacy {
    fn execute(
        &self,
        program: &Path,
        args: &[String],
        working_dir: &Path,
        sink: &mut dyn LineSink,
    ) -> Result<()> {
        assert!(working_dir.is_dir());
        let storage = args[2].clone();
        self.invoked.borrow_mut().push(format!("{} {}", args[0], storage));

        sink.accept(&format!("Storage set to {storage}"));
        for line in &self.extra_lines {
            sink.accept(line);
        }
        if args[0] == "backup" {
            sink.accept("Files: 100 total, 10G bytes; 5 new, 200M bytes");
            sink.accept("All chunks: 400 total, 12G bytes; 20 new, 300M bytes, 290M bytes uploaded");
        }

        if self.fail_storage == Some(storage.as_str()) {
            return Err(Error::CommandFailed {
                program: program.display().to_string(),
                args: args.to_vec(),
                status: ExitStatus::from_raw(256),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct Outbox {
    topics: RefCell<Vec<String>>,
}

impl Notification for Outbox {
    fn send<D1: Display, D2: Display>(&self, topic: D1, _msg: D2) -> Result<()> {
        self.topics.borrow_mut().push(topic.to_string());
        Ok(())
    }
}

fn config(repository: &Path, storages: &[&str]) -> DuplicacyConfig {
    DuplicacyConfig {
        repository: repository.to_path_buf(),
        duplicacy_path: PathBuf::from("duplicacy"),
        storage: storages
            .iter()
            .map(|s| BackupInfo::builder().name(*s).build())
            .collect(),
        copy: vec![],
        prune: vec![PruneInfo::builder().storage(storages[0]).keep("0:30").build()],
        check: vec![CheckInfo::builder().storage(storages[0]).build()],
        notifications: vec![],
    }
}

fn run(
    dir: &TempDir,
    config: &DuplicacyConfig,
    executor: &FakeDuplicacy,
    outbox: &[Outbox],
    ctx: &mut RunContext,
) -> Result<()> {
    let notifier = Notifications::new("nightly", outbox);
    Orchestrator::builder()
        .config(config)
        .config_name("nightly")
        .executor(executor)
        .notifier(&notifier)
        .log_dir(dir.path())
        .build()
        .run(RunModes::all(), ctx)
}

#[test]
fn test_every_backup_target_recorded_in_order() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), &["one", "two", "three", "four"]);
    let executor = FakeDuplicacy::new(None);
    let outbox = [Outbox::default()];
    let mut ctx = RunContext::new();

    run(&dir, &config, &executor, &outbox, &mut ctx).unwrap();

    let storages: Vec<_> = ctx.backup_table().iter().map(|r| r.storage().clone()).collect();
    assert_eq!(storages, ["one", "two", "three", "four"]);
    for rev in ctx.backup_table() {
        assert_eq!(rev.stats().files_total_count().as_deref(), Some("100"));
        assert_eq!(rev.stats().chunk_new_uploaded().as_deref(), Some("290M"));
    }
    assert_eq!(
        *outbox[0].topics.borrow(),
        ["nightly backup started", "nightly backup succeeded"]
    );
}

#[test]
fn test_kth_failure_keeps_earlier_records_only() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), &["one", "two", "three", "four"]);
    let executor = FakeDuplicacy::new(Some("three"));
    let outbox = [Outbox::default()];
    let mut ctx = RunContext::new();

    let err = run(&dir, &config, &executor, &outbox, &mut ctx).unwrap_err();

    assert!(matches!(err, Error::CommandFailed { .. }));
    assert_eq!(ctx.backup_table().len(), 2);
    assert_eq!(
        *executor.invoked.borrow(),
        ["backup one", "backup two", "backup three"]
    );
    assert_eq!(*outbox[0].topics.borrow(), ["nightly backup started"]);
}

#[test]
fn test_password_prompt_is_logged_and_run_continues() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), &["primary"]);
    let mut executor = FakeDuplicacy::new(None);
    executor.extra_lines = vec!["Enter storage password: "];
    let outbox = [Outbox::default()];
    let mut ctx = RunContext::new();

    run(&dir, &config, &executor, &outbox, &mut ctx).unwrap();

    let logged = std::fs::read_to_string(log_file_path(dir.path(), "nightly")).unwrap();
    assert!(logged.contains(PASSWORD_WARNING));
    assert!(logged.contains("Enter storage password: "));
    assert_eq!(ctx.backup_table().len(), 1);
}
