use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::paths;
use crate::shell;

/// Root configuration structure for devflow.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DevflowConfig {
    #[serde(default)]
    pub scaffold: ScaffoldConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Code generator used by `devflow scaffold`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScaffoldConfig {
    /// Command prefix the artifact kind and resource name are appended to.
    #[serde(default = "default_generate_command")]
    pub generate_command: String,

    /// Framework name shown in the banner line.
    #[serde(default = "default_framework")]
    pub framework: String,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            generate_command: default_generate_command(),
            framework: default_framework(),
        }
    }
}

/// Everything `devflow bootstrap` runs, in one immutable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootstrapConfig {
    #[serde(default = "default_project_title")]
    pub project_title: String,

    #[serde(default = "default_compose_command")]
    pub compose_command: String,

    #[serde(default = "default_compose_file")]
    pub compose_file: String,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub dependencies: DependenciesConfig,

    #[serde(default)]
    pub schema: SchemaConfig,

    #[serde(default = "default_dev_server_command")]
    pub dev_server_command: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            project_title: default_project_title(),
            compose_command: default_compose_command(),
            compose_file: default_compose_file(),
            database: DatabaseConfig::default(),
            readiness: ReadinessConfig::default(),
            dependencies: DependenciesConfig::default(),
            schema: SchemaConfig::default(),
            dev_server_command: default_dev_server_command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Compose service started with `up -d`.
    #[serde(default = "default_db_service")]
    pub service: String,

    /// Running container the readiness probe is executed in.
    #[serde(default = "default_db_container")]
    pub container: String,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default = "default_db_display_name")]
    pub display_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            service: default_db_service(),
            container: default_db_container(),
            user: default_db_user(),
            display_name: default_db_display_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessConfig {
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ReadinessConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependenciesConfig {
    /// Install is skipped when this path exists.
    #[serde(default = "default_marker_path")]
    pub marker_path: String,

    #[serde(default = "default_install_command")]
    pub install_command: String,
}

impl Default for DependenciesConfig {
    fn default() -> Self {
        Self {
            marker_path: default_marker_path(),
            install_command: default_install_command(),
        }
    }
}

impl DependenciesConfig {
    pub fn marker(&self) -> PathBuf {
        paths::expand(&self.marker_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaConfig {
    #[serde(default = "default_migrate_command")]
    pub migrate_command: String,

    #[serde(default = "default_generate_client_command")]
    pub generate_client_command: String,

    #[serde(default = "default_seed_command")]
    pub seed_command: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            migrate_command: default_migrate_command(),
            generate_client_command: default_generate_client_command(),
            seed_command: default_seed_command(),
        }
    }
}

impl BootstrapConfig {
    fn compose(&self, tail: &str) -> String {
        let file = paths::expand(&self.compose_file).display().to_string();
        format!(
            "{} -f {} {}",
            self.compose_command,
            shell::quote_arg(&file),
            tail
        )
    }

    pub fn cleanup_command(&self) -> String {
        self.compose("down --volumes")
    }

    pub fn start_database_command(&self) -> String {
        self.compose(&format!("up -d {}", self.database.service))
    }

    pub fn probe_command(&self) -> String {
        format!(
            "docker exec {} pg_isready -U {}",
            self.database.container, self.database.user
        )
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_generate_command() -> String {
    "nest generate".to_string()
}

fn default_framework() -> String {
    "NestJS".to_string()
}

fn default_project_title() -> String {
    "Gym Management System".to_string()
}

fn default_compose_command() -> String {
    "docker-compose".to_string()
}

fn default_compose_file() -> String {
    "./docker-compose.yml".to_string()
}

fn default_db_service() -> String {
    "postgres".to_string()
}

fn default_db_container() -> String {
    "gym-postgres".to_string()
}

fn default_db_user() -> String {
    "admin".to_string()
}

fn default_db_display_name() -> String {
    "PostgreSQL".to_string()
}

fn default_grace_period_ms() -> u64 {
    2_000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_marker_path() -> String {
    "node_modules".to_string()
}

fn default_install_command() -> String {
    "pnpm install".to_string()
}

fn default_migrate_command() -> String {
    "npx prisma migrate dev --name init".to_string()
}

fn default_generate_client_command() -> String {
    "npx prisma generate".to_string()
}

fn default_seed_command() -> String {
    "npx prisma db seed".to_string()
}

fn default_dev_server_command() -> String {
    "pnpm start:dev".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Where the effective configuration came from.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum ConfigSource {
    Explicit(PathBuf),
    Project(PathBuf),
    Global(PathBuf),
    BuiltIn,
}

/// Pick the config file that would be loaded, without reading it.
///
/// Order: explicit path, `./devflow.json`, `~/.config/devflow/devflow.json`.
pub fn resolve_source(explicit: Option<&Path>, cwd: &Path) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let project = paths::project_config(cwd);
    if project.exists() {
        return ConfigSource::Project(project);
    }

    match paths::global_config() {
        Ok(global) if global.exists() => ConfigSource::Global(global),
        _ => ConfigSource::BuiltIn,
    }
}

/// Load the effective configuration. A file that exists but does not parse is
/// an error; a missing file means built-in defaults.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<(DevflowConfig, ConfigSource)> {
    let source = resolve_source(explicit, cwd);

    let config = match &source {
        ConfigSource::Explicit(path) | ConfigSource::Project(path) | ConfigSource::Global(path) => {
            load_config_from_file(path)?
        }
        ConfigSource::BuiltIn => DevflowConfig::default(),
    };

    validate(&config)?;
    Ok((config, source))
}

fn load_config_from_file(path: &Path) -> Result<DevflowConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

fn validate(config: &DevflowConfig) -> Result<()> {
    let readiness = &config.bootstrap.readiness;
    if readiness.poll_interval_ms == 0 {
        return Err(Error::config_invalid_value(
            "bootstrap.readiness.poll_interval_ms",
            Some("0".to_string()),
            "Poll interval must be greater than zero",
        ));
    }
    if readiness.timeout_ms == 0 {
        return Err(Error::config_invalid_value(
            "bootstrap.readiness.timeout_ms",
            Some("0".to_string()),
            "Readiness timeout must be greater than zero",
        ));
    }

    let bootstrap = &config.bootstrap;
    let commands = [
        ("scaffold.generate_command", &config.scaffold.generate_command),
        ("bootstrap.compose_command", &bootstrap.compose_command),
        (
            "bootstrap.dependencies.install_command",
            &bootstrap.dependencies.install_command,
        ),
        ("bootstrap.schema.migrate_command", &bootstrap.schema.migrate_command),
        (
            "bootstrap.schema.generate_client_command",
            &bootstrap.schema.generate_client_command,
        ),
        ("bootstrap.schema.seed_command", &bootstrap.schema.seed_command),
        ("bootstrap.dev_server_command", &bootstrap.dev_server_command),
    ];

    for (key, command) in commands {
        if command.trim().is_empty() {
            return Err(Error::config_invalid_value(
                key,
                None,
                "Command must not be empty",
            ));
        }
    }

    Ok(())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> DevflowConfig {
    DevflowConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_commands_match_stack_defaults() {
        let config = builtin_defaults().bootstrap;
        assert_eq!(
            config.cleanup_command(),
            "docker-compose -f ./docker-compose.yml down --volumes"
        );
        assert_eq!(
            config.start_database_command(),
            "docker-compose -f ./docker-compose.yml up -d postgres"
        );
        assert_eq!(
            config.probe_command(),
            "docker exec gym-postgres pg_isready -U admin"
        );
        assert_eq!(config.readiness.timeout(), Duration::from_secs(30));
        assert_eq!(config.readiness.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn compose_file_with_spaces_is_quoted() {
        let config = BootstrapConfig {
            compose_file: "/srv/gym app/docker-compose.yml".to_string(),
            ..BootstrapConfig::default()
        };
        assert_eq!(
            config.cleanup_command(),
            "docker-compose -f '/srv/gym app/docker-compose.yml' down --volumes"
        );
        assert_eq!(
            config.start_database_command(),
            "docker-compose -f '/srv/gym app/docker-compose.yml' up -d postgres"
        );
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: DevflowConfig = serde_json::from_str(
            r#"{"bootstrap": {"database": {"container": "shop-db"}, "readiness": {"timeout_ms": 5000}}}"#,
        )
        .unwrap();

        assert_eq!(config.bootstrap.database.container, "shop-db");
        assert_eq!(config.bootstrap.database.user, "admin");
        assert_eq!(config.bootstrap.readiness.timeout_ms, 5000);
        assert_eq!(config.bootstrap.readiness.poll_interval_ms, 100);
        assert_eq!(config.scaffold, ScaffoldConfig::default());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut config = builtin_defaults();
        config.bootstrap.readiness.poll_interval_ms = 0;
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn blank_command_is_rejected() {
        let mut config = builtin_defaults();
        config.bootstrap.schema.seed_command = "  ".to_string();
        let err = validate(&config).unwrap_err();
        assert_eq!(err.details["key"], "bootstrap.schema.seed_command");
    }
}
