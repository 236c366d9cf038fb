use clap::Args;
use devflow::bootstrap::{self, Bootstrapper};
use devflow::console::Console;
use devflow::interrupt;
use devflow::log_status;
use devflow::readiness::SystemClock;
use devflow::runner::SystemRunner;

use super::GlobalArgs;

#[derive(Args)]
pub struct BootstrapArgs {
    /// List the stages and their commands without running anything
    #[arg(long)]
    pub plan: bool,
}

pub fn run(args: BootstrapArgs, global: &GlobalArgs) -> devflow::Result<i32> {
    let (config, _source) = super::load_config(global)?;
    let mut console = Console::stdio(global.color);

    if args.plan {
        for (index, planned) in bootstrap::plan(&config.bootstrap).iter().enumerate() {
            let mut line = format!(
                "{}. {}: {}",
                index + 1,
                planned.stage.label(),
                planned.command
            );
            if let Some(note) = &planned.note {
                line.push_str(&format!(" ({})", note));
            }
            console.line(&line);
        }
        return Ok(0);
    }

    let interrupt = interrupt::install();
    log_status!("bootstrap", "Ctrl-C stops the pipeline and runs cleanup");

    let runner = SystemRunner;
    let clock = SystemClock::new();
    let mut bootstrapper = Bootstrapper::new(
        config.bootstrap,
        &runner,
        &clock,
        &mut console,
        interrupt,
    );

    Ok(bootstrapper.run_to_exit_code())
}
