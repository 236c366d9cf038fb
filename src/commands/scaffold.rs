use clap::Args;
use devflow::console::Console;
use devflow::runner::SystemRunner;
use devflow::scaffold::Scaffolder;

use super::GlobalArgs;

#[derive(Args)]
pub struct ScaffoldArgs {
    /// Name of the resource to generate (e.g. 'member' or 'user')
    pub resource: String,

    /// Print the generator commands without running them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ScaffoldArgs, global: &GlobalArgs) -> devflow::Result<i32> {
    let (config, _source) = super::load_config(global)?;

    let runner = SystemRunner;
    let mut console = Console::stdio(global.color);
    let mut scaffolder = Scaffolder::new(&config.scaffold, &runner, &mut console);

    if args.dry_run {
        scaffolder.dry_run(&args.resource)?;
        return Ok(0);
    }

    Ok(scaffolder.run_to_exit_code(&args.resource))
}
