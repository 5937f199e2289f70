use clap::Parser;
use k_duplicacy::duplicacy::config::DuplicacyConfig;
use k_duplicacy::duplicacy::executor::SystemExecutor;
use k_duplicacy::duplicacy::notifications::{Notifications, RunNotifier};
use k_duplicacy::duplicacy::orchestrator::{Orchestrator, RunModes, DEFAULT_LOG_KEEP};
use k_duplicacy::duplicacy::result_error::error::Error;
use k_duplicacy::duplicacy::result_error::result::Result;
use k_duplicacy::duplicacy::result_error::WithMsg;
use k_duplicacy::duplicacy::runner::RunContext;
use k_duplicacy::duplicacy::validate::{validate_dir_exist_or_created, validate_valid_config_name};
use std::path::{Path, PathBuf};
use std::process::exit;
use tracing::{error, info, Level};
use validator::{ValidationError, ValidationErrors};

/// Run duplicacy backup, copy, prune and check over every configured storage
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of config file
    #[arg(short = 'f', long)]
    config: PathBuf,
    /// Directory holding the run logs
    #[arg(long, default_value = "log")]
    log_dir: PathBuf,
    /// Number of old run logs to keep
    #[arg(long, default_value_t = DEFAULT_LOG_KEEP)]
    log_keep: usize,
    /// Perform duplicacy backup
    #[arg(short, long)]
    backup: bool,
    /// Perform duplicacy copy
    #[arg(short, long)]
    copy: bool,
    /// Perform duplicacy prune
    #[arg(short, long)]
    prune: bool,
    /// Perform duplicacy check
    #[arg(short = 'k', long)]
    check: bool,
    /// Perform every operation
    #[arg(short, long)]
    all: bool,
    /// Print the configured targets and exit
    #[arg(long)]
    print_config: bool,
    /// Verbose console output
    #[arg(short, long)]
    verbose: bool,
    /// Log every duplicacy command line
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn modes(&self) -> RunModes {
        if self.all {
            return RunModes::all();
        }
        RunModes {
            backup: self.backup,
            copy: self.copy,
            prune: self.prune,
            check: self.check,
        }
    }
}

fn config_name(path: &Path) -> Result<String> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    validate_valid_config_name(&name)
        .map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add("config", e);
            Error::from(errors)
        })
        .with_msg(format!("Invalid config file path: {:?}", path))?;
    Ok(name)
}

fn prepare_log_dir(dir: &Path) -> Result<()> {
    validate_dir_exist_or_created(dir).map_err(|e: ValidationError| {
        let mut errors = ValidationErrors::new();
        errors.add("log_dir", e);
        Error::from(errors)
    })
}

fn run(args: &Args) -> Result<()> {
    let name = config_name(&args.config)?;
    let config = DuplicacyConfig::load(&args.config)?;
    info!("Using config file:   {:?}", args.config);

    if args.print_config {
        print!("{}", config.summary());
        return Ok(());
    }

    let modes = args.modes();
    if !modes.any() {
        return Err(Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no operation requested, use --backup, --copy, --prune, --check or --all",
        )));
    }

    prepare_log_dir(&args.log_dir)?;
    let notifier = Notifications::new(&name, &config.notifications);
    let mut ctx = RunContext::new();
    let res = Orchestrator::builder()
        .config(&config)
        .config_name(&name)
        .executor(&SystemExecutor)
        .notifier(&notifier)
        .log_dir(&args.log_dir)
        .log_keep(args.log_keep)
        .log_commands(args.debug)
        .build()
        .run(modes, &mut ctx);

    res.or_else(|e| match notifier.notify_failure(&ctx, &e) {
        Ok(_) => Err(e),
        Err(notify_error) => {
            Err(e.chain(notify_error.with_msg("Failed to send failure notification")))
        }
    })
}

fn main() {
    let args = Args::parse();
    let level = match (args.debug, args.verbose) {
        (true, _) => Level::TRACE,
        (false, true) => Level::DEBUG,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match run(&args) {
        Ok(_) => info!("Backup completed"),
        Err(e) => {
            error!("{e}");
            exit(1);
        }
    }
}
