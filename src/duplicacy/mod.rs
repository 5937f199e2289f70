pub mod classify;
pub mod command;
pub mod config;
pub mod executor;
pub mod notifications;
pub mod orchestrator;
pub mod redacted;
pub mod report;
pub mod result_error;
pub mod revision;
pub mod run_log;
pub mod runner;
pub mod validate;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
