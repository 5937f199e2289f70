//! # k-duplicacy
//!
//! Unattended driver for the `duplicacy` command line backup tool.
//!
//! ## Features
//!
//! - **Sequenced runs**: backup, copy, prune and check over every configured storage
//! - **Statistics**: file and chunk counts scraped from duplicacy's output
//! - **Fail fast**: the first failed invocation stops the whole run
//! - **Run logs**: one rotated, time stamped log file per configuration
//! - **Notifications**: start/success/failure reports over SMTP
//!
//! ## Quick Start
//!
//! ```no_run
//! use k_duplicacy::duplicacy::config::DuplicacyConfig;
//! use k_duplicacy::duplicacy::executor::SystemExecutor;
//! use k_duplicacy::duplicacy::notifications::Notifications;
//! use k_duplicacy::duplicacy::orchestrator::{Orchestrator, RunModes};
//! use k_duplicacy::duplicacy::runner::RunContext;
//!
//! let config = DuplicacyConfig::load("nightly.yml")?;
//! let notifier = Notifications::new("nightly", &config.notifications);
//! let mut ctx = RunContext::new();
//! Orchestrator::builder()
//!     .config(&config)
//!     .config_name("nightly")
//!     .executor(&SystemExecutor)
//!     .notifier(&notifier)
//!     .log_dir(std::path::Path::new("log"))
//!     .build()
//!     .run(RunModes::all(), &mut ctx)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod duplicacy;
