//! JSON envelope for machine-readable command output.
//!
//! `{"success": true, "data": ...}` or `{"success": false, "error": {...}}`.

use std::io::{self, Write};

use devflow::error::Hint;
use devflow::{Error, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct Envelope<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody<'a>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
    details: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    hints: Option<&'a [Hint]>,
}

impl<'a> ErrorBody<'a> {
    fn from_error(err: &'a Error) -> Self {
        Self {
            code: err.code.as_str(),
            message: &err.message,
            details: &err.details,
            hints: (!err.hints.is_empty()).then_some(err.hints.as_slice()),
        }
    }
}

fn render(result: &Result<Value>) -> Result<String> {
    let envelope = match result {
        Ok(data) => Envelope {
            success: true,
            data: Some(data),
            error: None,
        },
        Err(err) => Envelope {
            success: false,
            data: None,
            error: Some(ErrorBody::from_error(err)),
        },
    };

    serde_json::to_string_pretty(&envelope)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize response".to_string())))
}

fn write_stdout(payload: &str) -> Result<()> {
    let mut handle = io::stdout().lock();
    match writeln!(handle, "{}", payload) {
        Ok(()) => Ok(()),
        // Reader went away (e.g. piped into `head`).
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(Error::internal_io(e.to_string(), Some("write stdout".to_string()))),
    }
}

pub fn print_json_result(result: Result<Value>) -> Result<()> {
    write_stdout(&render(&result)?)
}

pub fn print_error(err: &Error) -> Result<()> {
    print_json_result(Err(err.clone()))
}

/// Serialize a command's output and pair it with the exit code to use.
pub fn map_cmd_result_to_json<T: Serialize>(result: Result<(T, i32)>) -> (Result<Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = err.code.exit_code();
            (Err(err), exit_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devflow::error::CommandFailedDetails;

    #[test]
    fn command_failure_envelope_carries_output() {
        let err = Error::command_failed(CommandFailedDetails {
            command: "nest generate service order".to_string(),
            exit_code: 127,
            stdout: "some stdout".to_string(),
            stderr: "some stderr".to_string(),
            stage: Some("service".to_string()),
        });

        let json: Value = serde_json::from_str(&render(&Err(err)).unwrap()).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "command.failed");
        assert_eq!(json["error"]["details"]["exitCode"], 127);
        assert_eq!(json["error"]["details"]["stderr"], "some stderr");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn success_envelope_wraps_data() {
        let data = serde_json::json!({"command": "config.path"});
        let json: Value = serde_json::from_str(&render(&Ok(data)).unwrap()).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["command"], "config.path");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn config_errors_map_to_exit_code_2() {
        let err = Error::config_invalid_value("bootstrap.readiness.timeout_ms", None, "zero");
        let (_value, exit_code) = map_cmd_result_to_json::<Value>(Err(err));
        assert_eq!(exit_code, 2);
    }

    #[test]
    fn hints_appear_only_when_present() {
        let bare: Value = serde_json::from_str(&render(&Err(Error::interrupted())).unwrap()).unwrap();
        assert!(bare["error"].get("hints").is_none());

        let hinted = Error::command_spawn_failed("pnpm install", "not found");
        let json: Value = serde_json::from_str(&render(&Err(hinted)).unwrap()).unwrap();
        assert_eq!(json["error"]["hints"][0]["message"], "Check that the program is installed and on PATH");
    }
}
