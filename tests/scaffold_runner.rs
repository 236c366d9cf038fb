mod common;

use common::{captured_console, Reply, ScriptedRunner};
use devflow::defaults::ScaffoldConfig;
use devflow::invocation::ExecutionMode;
use devflow::scaffold::{ArtifactKind, Scaffolder};

const MODULE: &str = "nest generate module order";
const CONTROLLER: &str = "nest generate controller order";
const SERVICE: &str = "nest generate service order";

fn config() -> ScaffoldConfig {
    ScaffoldConfig::default()
}

#[test]
fn generates_module_controller_service_in_order() {
    let runner = ScriptedRunner::new()
        .on(MODULE, Reply::ok_with("CREATE src/order/order.module.ts"))
        .on(CONTROLLER, Reply::ok_with("CREATE src/order/order.controller.ts"))
        .on(SERVICE, Reply::ok_with("CREATE src/order/order.service.ts"));
    let (mut console, out, _err) = captured_console();
    let config = config();

    let code = Scaffolder::new(&config, &runner, &mut console).run_to_exit_code("order");
    drop(console);

    assert_eq!(code, 0);
    assert_eq!(runner.displays(), vec![MODULE, CONTROLLER, SERVICE]);
    assert!(runner
        .calls()
        .iter()
        .all(|call| call.mode == ExecutionMode::Capture));

    let text = out.text();
    assert!(text.contains("Generating NestJS components for 'order'..."));
    assert!(text.contains("Executing: nest generate controller order"));
    assert!(text.contains("CREATE src/order/order.service.ts"));
    assert!(text.contains("Successfully generated all components for 'order'!"));
}

#[test]
fn report_lists_artifacts() {
    let runner = ScriptedRunner::new();
    let (mut console, _out, _err) = captured_console();
    let config = config();

    let report = Scaffolder::new(&config, &runner, &mut console)
        .run("order")
        .unwrap();

    assert_eq!(report.resource, "order");
    let kinds: Vec<ArtifactKind> = report.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, ArtifactKind::ORDER.to_vec());
}

#[test]
fn failure_stops_remaining_commands() {
    let commands = [MODULE, CONTROLLER, SERVICE];

    for failing in 0..commands.len() {
        let runner = ScriptedRunner::new().on(commands[failing], Reply::fail(1));
        let (mut console, _out, _err) = captured_console();
        let config = config();

        let code = Scaffolder::new(&config, &runner, &mut console).run_to_exit_code("order");

        assert_eq!(code, 1, "failing command {}", commands[failing]);
        assert_eq!(runner.displays(), commands[..=failing].to_vec());
    }
}

#[test]
fn failure_prints_command_return_code_and_output() {
    let runner = ScriptedRunner::new().on(
        CONTROLLER,
        Reply {
            exit_code: 3,
            stdout: "partial".to_string(),
            stderr: "Collection \"@nestjs/schematics\" cannot be resolved.".to_string(),
        },
    );
    let (mut console, out, err) = captured_console();
    let config = config();

    let result = Scaffolder::new(&config, &runner, &mut console).run("order");
    drop(console);

    let error = result.unwrap_err();
    let details = error.command_failure().unwrap();
    assert_eq!(details.command, CONTROLLER);
    assert_eq!(details.exit_code, 3);
    assert_eq!(details.stage.as_deref(), Some("controller"));

    let text = out.text();
    assert!(text.contains("Command failed: nest generate controller order"));
    assert!(text.contains("Return code: 3"));
    assert!(text.contains("Output: partial"));
    assert!(!text.contains("Successfully generated"));
    assert!(err.text().contains("cannot be resolved"));
}

#[test]
fn stderr_on_success_is_only_a_warning() {
    let runner = ScriptedRunner::new().on(
        MODULE,
        Reply::ok_with("CREATE src/order/order.module.ts").with_stderr("deprecated option"),
    );
    let (mut console, _out, err) = captured_console();
    let config = config();

    let code = Scaffolder::new(&config, &runner, &mut console).run_to_exit_code("order");
    drop(console);

    assert_eq!(code, 0);
    assert_eq!(runner.displays().len(), 3);
    assert!(err.text().contains("Warning: deprecated option"));
}

#[test]
fn blank_resource_is_a_usage_error() {
    let runner = ScriptedRunner::new();
    let (mut console, _out, err) = captured_console();
    let config = config();

    let code = Scaffolder::new(&config, &runner, &mut console).run_to_exit_code("   ");
    drop(console);

    assert_eq!(code, 2);
    assert!(runner.calls().is_empty());
    assert!(err.text().contains("Resource name is required"));
}

#[test]
fn dry_run_executes_nothing() {
    let runner = ScriptedRunner::new();
    let (mut console, out, _err) = captured_console();
    let config = config();

    let planned = Scaffolder::new(&config, &runner, &mut console)
        .dry_run("order")
        .unwrap();
    drop(console);

    assert_eq!(planned.len(), 3);
    assert!(runner.calls().is_empty());
    assert!(out.text().contains(SERVICE));
}
