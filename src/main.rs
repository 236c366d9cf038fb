use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::GlobalArgs;

#[derive(Debug, Clone, Copy)]
enum ResponseMode {
    Json,
    Console,
}

mod commands;
mod output;
mod tty;

use commands::{bootstrap, config, scaffold};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "devflow")]
#[command(version = VERSION)]
#[command(about = "Resource scaffolding and local development environment bring-up")]
struct Cli {
    /// Config file to use instead of ./devflow.json or ~/.config/devflow/devflow.json
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable colored status output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate module, controller and service for a resource
    Scaffold(scaffold::ScaffoldArgs),
    /// Bring up the local development environment and start the dev server
    Bootstrap(bootstrap::BootstrapArgs),
    /// Inspect the effective configuration
    Config(config::ConfigArgs),
}

fn response_mode(command: &Commands) -> ResponseMode {
    match command {
        Commands::Config(_) => ResponseMode::Json,
        Commands::Scaffold(_) | Commands::Bootstrap(_) => ResponseMode::Console,
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs {
        config: cli.config,
        color: tty::color_enabled(cli.no_color),
    };

    let exit_code = match response_mode(&cli.command) {
        ResponseMode::Json => {
            let (json_result, exit_code) = commands::run_json(cli.command, &global);
            if let Err(err) = output::print_json_result(json_result) {
                eprintln!("{}", err);
            }
            exit_code
        }
        ResponseMode::Console => match commands::run_console(cli.command, &global) {
            Ok(exit_code) => exit_code,
            Err(err) => {
                let exit_code = err.code.exit_code();
                if let Err(print_err) = output::print_error(&err) {
                    eprintln!("{}", print_err);
                }
                exit_code
            }
        },
    };

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
