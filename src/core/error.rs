use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    CommandFailed,
    CommandSpawnFailed,

    ReadinessTimeout,

    ProcessInterrupted,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::CommandFailed => "command.failed",
            ErrorCode::CommandSpawnFailed => "command.spawn_failed",

            ErrorCode::ReadinessTimeout => "readiness.timeout",

            ErrorCode::ProcessInterrupted => "process.interrupted",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }

    /// Process exit status for an entry point that stops on this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ConfigInvalidJson
            | ErrorCode::ConfigInvalidValue
            | ErrorCode::ValidationInvalidArgument => 2,

            ErrorCode::CommandFailed
            | ErrorCode::CommandSpawnFailed
            | ErrorCode::ReadinessTimeout => 1,

            ErrorCode::ProcessInterrupted => 0,

            ErrorCode::InternalIoError
            | ErrorCode::InternalJsonError
            | ErrorCode::InternalUnexpected => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

/// Everything needed to explain a non-zero exit: what ran, how it ended, what it said.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpawnFailedDetails {
    pub command: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessTimeoutDetails {
    pub target: String,
    pub elapsed_ms: u64,
    pub timeout_ms: u64,
    pub attempts: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
        .with_hint("Fix the JSON syntax or remove the file to fall back to built-in defaults")
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn command_failed(details: CommandFailedDetails) -> Self {
        let message = format!(
            "Command '{}' exited with code {}",
            details.command, details.exit_code
        );
        Self::new(ErrorCode::CommandFailed, message, to_details(details))
    }

    pub fn command_spawn_failed(command: impl Into<String>, error: impl Into<String>) -> Self {
        let command = command.into();
        let message = format!("Failed to start '{}'", command);
        let details = to_details(CommandSpawnFailedDetails {
            command,
            error: error.into(),
        });

        Self::new(ErrorCode::CommandSpawnFailed, message, details)
            .with_hint("Check that the program is installed and on PATH")
    }

    pub fn readiness_timeout(details: ReadinessTimeoutDetails) -> Self {
        let message = format!(
            "{} not ready within {}s",
            details.target,
            details.timeout_ms / 1000
        );
        Self::new(ErrorCode::ReadinessTimeout, message, to_details(details)).retryable(true)
    }

    pub fn interrupted() -> Self {
        Self::new(
            ErrorCode::ProcessInterrupted,
            "Process interrupted by user",
            Value::Object(serde_json::Map::new()),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    /// Message plus the most specific detail text, for one-line reports.
    pub fn summary(&self) -> String {
        self.details
            .get("error")
            .or_else(|| self.details.get("problem"))
            .and_then(|v| v.as_str())
            .map(|detail| format!("{} ({})", self.message, detail))
            .unwrap_or_else(|| self.message.clone())
    }

    pub fn is_interrupted(&self) -> bool {
        self.code == ErrorCode::ProcessInterrupted
    }

    /// Typed view of the details of a `command.failed` error.
    pub fn command_failure(&self) -> Option<CommandFailedDetails> {
        if self.code != ErrorCode::CommandFailed {
            return None;
        }
        serde_json::from_value(self.details.clone()).ok()
    }
}
