//! Local development environment bring-up.
//!
//! Stages run strictly in order and every stage before the dev server is
//! fail-fast: a non-zero exit prints a failure line and stops the pipeline
//! without running cleanup. Only a user interrupt triggers cleanup.

use serde::Serialize;

use crate::console::{Console, Spinner, Tone};
use crate::defaults::BootstrapConfig;
use crate::error::{CommandFailedDetails, Error, ReadinessTimeoutDetails, Result};
use crate::interrupt::InterruptFlag;
use crate::invocation::{ExecutionMode, Invocation};
use crate::readiness::{self, Clock, ReadinessPolicy, ReadinessState};
use crate::runner::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Cleanup,
    StartDatabase,
    WaitForDatabase,
    InstallDependencies,
    RunMigrations,
    GenerateClient,
    SeedDatabase,
    StartApplication,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Cleanup,
        Stage::StartDatabase,
        Stage::WaitForDatabase,
        Stage::InstallDependencies,
        Stage::RunMigrations,
        Stage::GenerateClient,
        Stage::SeedDatabase,
        Stage::StartApplication,
    ];

    /// Step name on the announcement line.
    pub fn category(&self) -> &'static str {
        match self {
            Stage::Cleanup => "CLEANUP",
            Stage::StartDatabase | Stage::WaitForDatabase => "DATABASE",
            Stage::InstallDependencies => "DEPENDENCIES",
            Stage::RunMigrations => "MIGRATIONS",
            Stage::GenerateClient => "CLIENT",
            Stage::SeedDatabase => "SEEDING",
            Stage::StartApplication => "APPLICATION",
        }
    }

    /// Step name on the completion/failure line.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Cleanup => "Container Cleanup",
            Stage::StartDatabase => "Container Start",
            Stage::WaitForDatabase => "Database Readiness",
            Stage::InstallDependencies => "Dependency Installation",
            Stage::RunMigrations => "Schema Migrate",
            Stage::GenerateClient => "Client Generate",
            Stage::SeedDatabase => "Database Seed",
            Stage::StartApplication => "Dev Server",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Stage::Cleanup => "🧹",
            Stage::StartDatabase => "🐘",
            Stage::WaitForDatabase => "⏳",
            Stage::InstallDependencies | Stage::RunMigrations => "📦",
            Stage::GenerateClient => "⚙️",
            Stage::SeedDatabase => "🌱",
            Stage::StartApplication => "🚀",
        }
    }

    fn tone(&self) -> Tone {
        match self {
            Stage::Cleanup => Tone::Yellow,
            Stage::StartDatabase => Tone::Blue,
            Stage::WaitForDatabase
            | Stage::InstallDependencies
            | Stage::RunMigrations
            | Stage::GenerateClient => Tone::Cyan,
            Stage::SeedDatabase => Tone::Green,
            Stage::StartApplication => Tone::Header,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum StageOutcome {
    Completed,
    Skipped { reason: String },
    Crashed { exit_code: i32 },
    StoppedByUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub stages: Vec<StageReport>,
}

impl BootstrapReport {
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|report| report.stage == stage)
            .map(|report| &report.outcome)
    }

    fn push(&mut self, stage: Stage, outcome: StageOutcome) {
        self.stages.push(StageReport { stage, outcome });
    }
}

/// One line of `bootstrap --plan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStage {
    pub stage: Stage,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The stages `run` would execute, with the command behind each.
pub fn plan(config: &BootstrapConfig) -> Vec<PlannedStage> {
    let readiness = &config.readiness;

    Stage::ALL
        .iter()
        .map(|stage| {
            let (command, note) = match stage {
                Stage::Cleanup => (config.cleanup_command(), None),
                Stage::StartDatabase => (
                    config.start_database_command(),
                    Some(format!("then wait {}ms", readiness.grace_period_ms)),
                ),
                Stage::WaitForDatabase => (
                    config.probe_command(),
                    Some(format!(
                        "every {}ms, up to {}ms",
                        readiness.poll_interval_ms, readiness.timeout_ms
                    )),
                ),
                Stage::InstallDependencies => (
                    config.dependencies.install_command.clone(),
                    Some(format!(
                        "skipped if {} exists",
                        config.dependencies.marker_path
                    )),
                ),
                Stage::RunMigrations => (config.schema.migrate_command.clone(), None),
                Stage::GenerateClient => {
                    (config.schema.generate_client_command.clone(), None)
                }
                Stage::SeedDatabase => (config.schema.seed_command.clone(), None),
                Stage::StartApplication => (
                    config.dev_server_command.clone(),
                    Some("foreground, runs until stopped".to_string()),
                ),
            };

            PlannedStage {
                stage: *stage,
                command,
                note,
            }
        })
        .collect()
}

pub struct Bootstrapper<'a> {
    config: BootstrapConfig,
    runner: &'a dyn CommandRunner,
    clock: &'a dyn Clock,
    console: &'a mut Console,
    interrupt: InterruptFlag,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(
        config: BootstrapConfig,
        runner: &'a dyn CommandRunner,
        clock: &'a dyn Clock,
        console: &'a mut Console,
        interrupt: InterruptFlag,
    ) -> Self {
        Self {
            config,
            runner,
            clock,
            console,
            interrupt,
        }
    }

    /// Run the whole pipeline.
    ///
    /// Returns `Err` for the first failing stage, for a readiness timeout and
    /// for an interrupt observed before the dev server started.
    pub fn run(&mut self) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();
        let title = format!("{} Initialization", self.config.project_title);
        self.console.header("💪", &title);

        self.cleanup()?;
        report.push(Stage::Cleanup, StageOutcome::Completed);

        self.start_database()?;
        report.push(Stage::StartDatabase, StageOutcome::Completed);

        self.wait_for_database()?;
        report.push(Stage::WaitForDatabase, StageOutcome::Completed);

        let install = self.install_dependencies()?;
        report.push(Stage::InstallDependencies, install);

        let migrate = self.config.schema.migrate_command.clone();
        self.announce(Stage::RunMigrations, "Running database migrations");
        self.run_stage(Stage::RunMigrations, &migrate)?;
        report.push(Stage::RunMigrations, StageOutcome::Completed);

        let generate = self.config.schema.generate_client_command.clone();
        self.announce(Stage::GenerateClient, "Generating database client");
        self.run_stage(Stage::GenerateClient, &generate)?;
        report.push(Stage::GenerateClient, StageOutcome::Completed);

        let seed = self.config.schema.seed_command.clone();
        self.announce(Stage::SeedDatabase, "Populating initial data");
        self.run_stage(Stage::SeedDatabase, &seed)?;
        report.push(Stage::SeedDatabase, StageOutcome::Completed);

        let application = self.start_application();
        report.push(Stage::StartApplication, application);

        Ok(report)
    }

    /// Entry-point semantics: run, and on interrupt tear the stack down.
    ///
    /// 0 when the pipeline completed or was interrupted and cleaned up,
    /// otherwise the failing error's exit code.
    pub fn run_to_exit_code(&mut self) -> i32 {
        match self.run() {
            Ok(_) => 0,
            Err(err) if err.is_interrupted() => match self.recover_from_interrupt() {
                Ok(()) => 0,
                Err(err) => err.code.exit_code(),
            },
            Err(err) => err.code.exit_code(),
        }
    }

    /// Log the interrupt and run cleanup.
    pub fn recover_from_interrupt(&mut self) -> Result<()> {
        self.console.status(
            "🛑",
            Tone::Yellow,
            "SYSTEM",
            "Process interrupted by user",
        );
        self.interrupt.clear();
        self.cleanup()
    }

    /// Tear down containers and volumes. Safe to run when nothing exists.
    pub fn cleanup(&mut self) -> Result<()> {
        self.announce(Stage::Cleanup, "Removing existing containers");
        let command = self.config.cleanup_command();
        self.run_stage(Stage::Cleanup, &command)
    }

    fn start_database(&mut self) -> Result<()> {
        let message = format!("Starting {}", self.config.database.display_name);
        self.announce(Stage::StartDatabase, &message);
        let command = self.config.start_database_command();
        self.run_stage(Stage::StartDatabase, &command)?;

        self.clock.sleep(self.config.readiness.grace_period());
        self.check_interrupt()
    }

    fn wait_for_database(&mut self) -> Result<()> {
        let name = self.config.database.display_name.clone();
        self.announce(
            Stage::WaitForDatabase,
            &format!("Waiting for {} readiness", name),
        );

        let policy = ReadinessPolicy {
            interval: self.config.readiness.poll_interval(),
            timeout: self.config.readiness.timeout(),
        };
        let probe = Invocation::shell(&self.config.probe_command(), ExecutionMode::Capture);
        let runner = self.runner;
        let clock = self.clock;
        let interrupt = self.interrupt.clone();
        let console = &mut *self.console;
        let mut spinner = Spinner::default();

        let outcome = readiness::poll_until_ready(
            policy,
            clock,
            &interrupt,
            &mut || runner.capture(&probe).map(|result| result.success()),
            &mut |_| {
                console.spinner(spinner.frame(), "Checking database connection...");
                spinner.advance();
            },
        );
        self.console.end_spinner();
        let outcome = outcome?;

        match outcome.state {
            ReadinessState::Ready => {
                self.console.status(
                    "✅",
                    Tone::Green,
                    Stage::WaitForDatabase.category(),
                    &format!("{} ready", name),
                );
                Ok(())
            }
            _ => {
                let timeout_secs = policy.timeout.as_secs_f64();
                self.console.status(
                    "❌",
                    Tone::Red,
                    Stage::WaitForDatabase.category(),
                    &format!("{} not ready within {}s", name, timeout_secs),
                );
                Err(Error::readiness_timeout(ReadinessTimeoutDetails {
                    target: name,
                    elapsed_ms: outcome.elapsed.as_millis() as u64,
                    timeout_ms: policy.timeout.as_millis() as u64,
                    attempts: outcome.attempts,
                }))
            }
        }
    }

    fn install_dependencies(&mut self) -> Result<StageOutcome> {
        self.announce(Stage::InstallDependencies, "Installing dependencies");
        self.check_interrupt()?;

        let marker_path = self.config.dependencies.marker_path.clone();
        if self.config.dependencies.marker().exists() {
            self.console.status(
                "ℹ️",
                Tone::Cyan,
                Stage::InstallDependencies.category(),
                &format!("{} already exists", marker_path),
            );
            return Ok(StageOutcome::Skipped {
                reason: format!("{} already exists", marker_path),
            });
        }

        let command = self.config.dependencies.install_command.clone();
        self.run_stage(Stage::InstallDependencies, &command)?;
        Ok(StageOutcome::Completed)
    }

    fn start_application(&mut self) -> StageOutcome {
        self.announce(Stage::StartApplication, "Starting development server");

        let invocation = Invocation::shell(&self.config.dev_server_command, ExecutionMode::Inherit);
        let exit_code = match self.runner.inherit(&invocation) {
            Ok(code) => code,
            Err(err) => {
                self.console.error_line(&format!("Error: {}", err.summary()));
                -1
            }
        };

        if self.interrupt.is_set() {
            self.interrupt.clear();
            self.console.status(
                "🛑",
                Tone::Yellow,
                Stage::StartApplication.category(),
                "Server stopped by user",
            );
            return StageOutcome::StoppedByUser;
        }

        if exit_code != 0 {
            self.console.status(
                "💥",
                Tone::Red,
                Stage::StartApplication.category(),
                "Server crashed",
            );
            return StageOutcome::Crashed { exit_code };
        }

        StageOutcome::Completed
    }

    /// Stream one shell command's stdout, indented, and require exit code 0.
    fn run_stage(&mut self, stage: Stage, command: &str) -> Result<()> {
        self.check_interrupt()?;

        let invocation = Invocation::shell(command, ExecutionMode::Stream);
        let exit_code = match self.stream(&invocation) {
            Ok(code) => code,
            Err(err) => {
                self.report_failure(stage, &invocation, None);
                return Err(err);
            }
        };

        self.check_interrupt()?;

        if exit_code != 0 {
            self.report_failure(stage, &invocation, Some(exit_code));
            return Err(Error::command_failed(CommandFailedDetails {
                command: invocation.display,
                exit_code,
                stdout: String::new(),
                stderr: String::new(),
                stage: Some(stage.label().to_string()),
            }));
        }

        self.console
            .status("✅", Tone::Green, stage.label(), "Completed successfully");
        Ok(())
    }

    fn stream(&mut self, invocation: &Invocation) -> Result<i32> {
        let mut lines = self.runner.stream(invocation)?;
        for line in lines.by_ref() {
            let line = line.trim();
            self.console.line(&format!("    {}", line));
        }
        lines.finish()
    }

    fn report_failure(&mut self, stage: Stage, invocation: &Invocation, exit_code: Option<i32>) {
        self.console.status("❌", Tone::Red, stage.label(), "Failed");
        self.console
            .line(&format!("Command: {}", invocation.display));
        match exit_code {
            Some(code) => self.console.line(&format!("Exit code: {}", code)),
            None => self.console.line("Exit code: none (command did not start)"),
        }
    }

    fn announce(&mut self, stage: Stage, message: &str) {
        self.console
            .status(stage.icon(), stage.tone(), stage.category(), message);
    }

    fn check_interrupt(&self) -> Result<()> {
        if self.interrupt.is_set() {
            Err(Error::interrupted())
        } else {
            Ok(())
        }
    }
}
