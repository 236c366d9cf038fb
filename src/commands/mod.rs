use std::env;
use std::path::PathBuf;

use devflow::defaults::{self, ConfigSource, DevflowConfig};
use devflow::log_status;

pub type CmdResult<T> = devflow::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub color: bool,
}

pub mod bootstrap;
pub mod config;
pub mod scaffold;

pub(crate) fn current_dir() -> devflow::Result<PathBuf> {
    env::current_dir().map_err(|e| {
        devflow::Error::internal_io(e.to_string(), Some("read current directory".to_string()))
    })
}

/// Load devflow.json the same way for every command.
pub(crate) fn load_config(global: &GlobalArgs) -> devflow::Result<(DevflowConfig, ConfigSource)> {
    let cwd = current_dir()?;

    let (config, source) = defaults::load_config(global.config.as_deref(), &cwd)?;
    match &source {
        ConfigSource::Explicit(path) | ConfigSource::Project(path) | ConfigSource::Global(path) => {
            log_status!("config", "Loaded {}", path.display());
        }
        ConfigSource::BuiltIn => {}
    }

    Ok((config, source))
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (devflow::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Config(args) => dispatch!(args, global, config),
        crate::Commands::Scaffold(_) | crate::Commands::Bootstrap(_) => {
            let err = devflow::Error::validation_invalid_argument(
                "output_mode",
                "Command writes status lines, not JSON",
                None,
                None,
            );
            crate::output::map_cmd_result_to_json::<serde_json::Value>(Err(err))
        }
    }
}

/// Run a command that talks to the terminal directly and return its exit code.
pub(crate) fn run_console(command: crate::Commands, global: &GlobalArgs) -> devflow::Result<i32> {
    match command {
        crate::Commands::Scaffold(args) => scaffold::run(args, global),
        crate::Commands::Bootstrap(args) => bootstrap::run(args, global),
        crate::Commands::Config(_) => Err(devflow::Error::validation_invalid_argument(
            "output_mode",
            "Config output is JSON only",
            None,
            None,
        )),
    }
}
