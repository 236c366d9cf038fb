//! Module/controller/service generation for one resource.

use serde::Serialize;

use crate::console::Console;
use crate::defaults::ScaffoldConfig;
use crate::error::{CommandFailedDetails, Error, ErrorCode, Result};
use crate::invocation::{ExecutionMode, Invocation};
use crate::runner::CommandRunner;
use crate::utils::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Module,
    Controller,
    Service,
}

impl ArtifactKind {
    /// Generation order. Controllers and services register into the module.
    pub const ORDER: [ArtifactKind; 3] = [
        ArtifactKind::Module,
        ArtifactKind::Controller,
        ArtifactKind::Service,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Module => "module",
            ArtifactKind::Controller => "controller",
            ArtifactKind::Service => "service",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub command: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScaffoldReport {
    pub resource: String,
    pub artifacts: Vec<GeneratedArtifact>,
}

/// The three invocations for `resource`, in generation order.
pub fn plan(config: &ScaffoldConfig, resource: &str) -> Result<Vec<(ArtifactKind, Invocation)>> {
    let resource = validation::require_non_empty(resource, "resource", "Resource name is required")?;

    ArtifactKind::ORDER
        .iter()
        .map(|kind| {
            let line = format!("{} {} {}", config.generate_command, kind.as_str(), resource);
            Invocation::from_command_line(&line, ExecutionMode::Capture).map(|inv| (*kind, inv))
        })
        .collect()
}

pub struct Scaffolder<'a> {
    config: &'a ScaffoldConfig,
    runner: &'a dyn CommandRunner,
    console: &'a mut Console,
}

impl<'a> Scaffolder<'a> {
    pub fn new(
        config: &'a ScaffoldConfig,
        runner: &'a dyn CommandRunner,
        console: &'a mut Console,
    ) -> Self {
        Self {
            config,
            runner,
            console,
        }
    }

    /// Generate all three artifacts, stopping at the first failing command.
    ///
    /// Failures are reported to the console here; the returned error carries
    /// the same details for callers.
    pub fn run(&mut self, resource: &str) -> Result<ScaffoldReport> {
        let planned = plan(self.config, resource)?;
        let resource = resource.trim().to_string();

        self.console.line(&format!(
            "\n🚀 Generating {} components for '{}'...",
            self.config.framework, resource
        ));

        let mut artifacts = Vec::with_capacity(planned.len());
        for (kind, invocation) in planned {
            self.console
                .line(&format!("\nExecuting: {}", invocation.display));

            let result = match self.runner.capture(&invocation) {
                Ok(result) => result,
                Err(err) => {
                    self.console
                        .line(&format!("\n❌ Command failed: {}", invocation.display));
                    self.console.error_line(&format!("Error: {}", err.summary()));
                    return Err(err);
                }
            };

            if !result.success() {
                self.console
                    .line(&format!("\n❌ Command failed: {}", invocation.display));
                self.console
                    .line(&format!("Return code: {}", result.exit_code));
                self.console.line(&format!("Output: {}", result.stdout));
                self.console
                    .error_line(&format!("Error: {}", result.stderr));

                return Err(Error::command_failed(CommandFailedDetails {
                    command: invocation.display,
                    exit_code: result.exit_code,
                    stdout: result.stdout,
                    stderr: result.stderr,
                    stage: Some(kind.as_str().to_string()),
                }));
            }

            self.console.line(&result.stdout);
            if !result.stderr.is_empty() {
                self.console
                    .error_line(&format!("Warning: {}", result.stderr));
            }

            artifacts.push(GeneratedArtifact {
                kind,
                command: invocation.display,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }

        self.console.line(&format!(
            "\n✅ Successfully generated all components for '{}'!",
            resource
        ));

        Ok(ScaffoldReport {
            resource,
            artifacts,
        })
    }

    /// Entry-point semantics: 0 when all three succeed, otherwise the error's exit code.
    pub fn run_to_exit_code(&mut self, resource: &str) -> i32 {
        match self.run(resource) {
            Ok(_) => 0,
            Err(err) => {
                if err.code == ErrorCode::ValidationInvalidArgument {
                    self.console.error_line(&format!("Error: {}", err.summary()));
                }
                err.code.exit_code()
            }
        }
    }

    /// Print the planned commands without running them.
    pub fn dry_run(&mut self, resource: &str) -> Result<Vec<Invocation>> {
        let planned = plan(self.config, resource)?;
        for (_, invocation) in &planned {
            self.console.line(&invocation.display);
        }
        Ok(planned.into_iter().map(|(_, inv)| inv).collect())
    }
}
