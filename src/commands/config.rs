use clap::{Args, Subcommand};
use devflow::defaults::{self, ConfigSource, DevflowConfig};
use serde::Serialize;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration (file values merged over built-in defaults)
    Show,
    /// Show which config file would be loaded
    Path,
}

#[derive(Serialize)]
pub struct ConfigOutput {
    pub command: String,
    pub source: ConfigSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<DevflowConfig>,
}

pub fn run(args: ConfigArgs, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let output = match args.command {
        ConfigCommand::Show => {
            let (config, source) = super::load_config(global)?;
            ConfigOutput {
                command: "config.show".to_string(),
                source,
                config: Some(config),
            }
        }
        ConfigCommand::Path => {
            let cwd = super::current_dir()?;
            ConfigOutput {
                command: "config.path".to_string(),
                source: defaults::resolve_source(global.config.as_deref(), &cwd),
                config: None,
            }
        }
    };

    Ok((output, 0))
}
