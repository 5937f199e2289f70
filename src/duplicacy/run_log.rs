//! The per-configuration run log and its rotation.
//!
//! Every line of tool output lands in `<log_dir>/<name>.log`, prefixed with the
//! local time. Status messages additionally go to the console through
//! `tracing`.

use crate::duplicacy::result_error::error::Error;
use crate::duplicacy::result_error::result::Result;
use crate::duplicacy::result_error::WithMsg;
use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const SEPARATOR: &str =
    "######################################################################";

pub fn log_file_path(log_dir: &Path, name: &str) -> PathBuf {
    log_dir.join(format!("{name}.log"))
}

fn generation_path(log_dir: &Path, name: &str, generation: usize) -> PathBuf {
    log_dir.join(format!("{name}.log.{generation}"))
}

/// Shifts `<name>.log` to `<name>.log.1`, `.1` to `.2` and so on, keeping at
/// most `keep` old generations. `keep == 0` just removes the current log.
pub fn rotate_log_files(log_dir: &Path, name: &str, keep: usize) -> Result<()> {
    let current = log_file_path(log_dir, name);
    if keep == 0 {
        return remove_if_exists(&current);
    }

    remove_if_exists(&generation_path(log_dir, name, keep))?;
    for generation in (1..keep).rev() {
        rename_if_exists(
            &generation_path(log_dir, name, generation),
            &generation_path(log_dir, name, generation + 1),
        )?;
    }
    rename_if_exists(&current, &generation_path(log_dir, name, 1))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err::<(), _>(Error::from(e))
            .with_msg(format!("Failed to remove old log {:?}", path)),
        _ => Ok(()),
    }
}

fn rename_if_exists(from: &Path, to: &Path) -> Result<()> {
    match std::fs::rename(from, to) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err::<(), _>(Error::from(e))
            .with_msg(format!("Failed to rotate log {:?} to {:?}", from, to)),
        _ => Ok(()),
    }
}

/// Time stamped line writer for one run.
pub struct RunLog {
    out: Box<dyn Write>,
}

impl RunLog {
    pub fn create(log_dir: &Path, name: &str) -> Result<Self> {
        let path = log_file_path(log_dir, name);
        let file = File::create(&path)
            .map_err(Error::from)
            .with_msg(format!("Failed to create run log {:?}", path))?;
        Ok(Self::new(BufWriter::new(file)))
    }

    pub fn new<W: Write + 'static>(out: W) -> Self {
        Self { out: Box::new(out) }
    }

    /// Writes `line` to the run log only.
    pub fn line(&mut self, line: &str) {
        let stamped = format!("{} {}", Local::now().format("%H:%M:%S"), line);
        if let Err(e) = writeln!(self.out, "{stamped}").and_then(|_| self.out.flush()) {
            error!("Failed to write run log: {e}");
        }
    }

    pub fn separator(&mut self) {
        self.line(SEPARATOR);
    }

    /// Writes `msg` to the run log and the console.
    pub fn message(&mut self, msg: &str) {
        info!("{msg}");
        self.line(msg);
    }

    pub fn warning(&mut self, msg: &str) {
        warn!("{msg}");
        self.line(msg);
    }

    pub fn error(&mut self, msg: &str) {
        error!("{msg}");
        self.line(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_rotation_shifts_generations() {
        let dir = TempDir::new().unwrap();
        let d = dir.path();
        std::fs::write(log_file_path(d, "nightly"), "current").unwrap();
        std::fs::write(generation_path(d, "nightly", 1), "one").unwrap();
        std::fs::write(generation_path(d, "nightly", 2), "two").unwrap();

        rotate_log_files(d, "nightly", 2).unwrap();

        assert!(!log_file_path(d, "nightly").exists());
        assert_eq!(read(generation_path(d, "nightly", 1)), "current");
        assert_eq!(read(generation_path(d, "nightly", 2)), "one");
        assert!(!generation_path(d, "nightly", 3).exists());
    }

    #[test]
    fn test_rotation_tolerates_missing_files() {
        let dir = TempDir::new().unwrap();
        rotate_log_files(dir.path(), "nightly", 5).unwrap();

        std::fs::write(log_file_path(dir.path(), "nightly"), "current").unwrap();
        rotate_log_files(dir.path(), "nightly", 5).unwrap();
        assert_eq!(read(generation_path(dir.path(), "nightly", 1)), "current");
    }

    #[test]
    fn test_rotation_with_zero_keep_removes_current() {
        let dir = TempDir::new().unwrap();
        std::fs::write(log_file_path(dir.path(), "nightly"), "current").unwrap();
        rotate_log_files(dir.path(), "nightly", 0).unwrap();
        assert!(!log_file_path(dir.path(), "nightly").exists());
        assert!(!generation_path(dir.path(), "nightly", 1).exists());
    }

    #[test]
    fn test_run_log_stamps_lines() {
        let dir = TempDir::new().unwrap();
        {
            let mut log = RunLog::create(dir.path(), "nightly").unwrap();
            log.separator();
            log.message("Backing up to storage b2 with 1 threads");
            log.line("Files: 1 total, 1K bytes; 0 new, 0 bytes");
        }

        let content = read(log_file_path(dir.path(), "nightly"));
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(SEPARATOR));
        assert!(lines[1].ends_with(" Backing up to storage b2 with 1 threads"));
        // HH:MM:SS prefix
        assert_eq!(lines[2].find(' '), Some(8));
    }
}
