//! Running the external tool and streaming its output one line at a time.

use crate::duplicacy::function_path;
use crate::duplicacy::result_error::error::Error;
use crate::duplicacy::result_error::result::Result;
use crate::duplicacy::result_error::WithMsg;
use function_name::named;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{channel, Sender};
use std::thread;
use tracing::{trace, warn};

/// Receives every line a child process prints, in order.
pub trait LineSink {
    fn accept(&mut self, line: &str);
}

impl<F: FnMut(&str)> LineSink for F {
    fn accept(&mut self, line: &str) {
        self(line)
    }
}

pub trait ProcessExecutor {
    /// Runs `program` in `working_dir`, feeding combined stdout/stderr to
    /// `sink`. Fails if the process cannot be started or exits unsuccessfully.
    fn execute(
        &self,
        program: &Path,
        args: &[String],
        working_dir: &Path,
        sink: &mut dyn LineSink,
    ) -> Result<()>;
}

/// Spawns real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemExecutor;

/// Forwards lines until EOF; invalid UTF-8 is replaced, never fatal.
fn forward_lines<R: Read + Send + 'static>(reader: R, tx: Sender<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if buf.ends_with(b"\n") {
                        buf.pop();
                        if buf.ends_with(b"\r") {
                            buf.pop();
                        }
                    }
                    if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read child output: {e}");
                    break;
                }
            }
        }
    })
}

impl ProcessExecutor for SystemExecutor {
    #[named]
    fn execute(
        &self,
        program: &Path,
        args: &[String],
        working_dir: &Path,
        sink: &mut dyn LineSink,
    ) -> Result<()> {
        trace!("Executing: {:?} {:?} in {:?}", program, args, working_dir);
        let mut child = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(Error::from)
            .with_msg(format!(
                "Failed to start {:?} in {:?} ({})",
                program,
                working_dir,
                function_path!()
            ))?;

        let (tx, rx) = channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        // Ends once both pipes are closed.
        for line in rx {
            sink.accept(&line);
        }
        for reader in readers {
            if reader.join().is_err() {
                warn!("Output reader for {:?} panicked", program);
            }
        }

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                program: program.display().to_string(),
                args: args.to_vec(),
                status,
            })
        }
    }
}
