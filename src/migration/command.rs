//! Migration units backed by shell commands.

use super::options::Options;
use super::types::{Migration, MigrationError, OptionsAware, Transactional};
use crate::config::CommandMigrationDefinition;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::process::Command;
use tracing::debug;

/// Runs `<shell> -c <command>` for each step of a unit.
///
/// Commands see the run through environment variables:
/// `TIDEMARK_VERSION`, `TIDEMARK_DIRECTION`, `TIDEMARK_FORCED`,
/// `TIDEMARK_DRY_RUN`, and `TIDEMARK_ERROR` for the abort command.
pub struct CommandMigration {
    definition: CommandMigrationDefinition,
    shell: String,
    working_dir: Option<PathBuf>,
    options: Mutex<Option<Options>>,
}

impl CommandMigration {
    pub fn new(definition: CommandMigrationDefinition, shell: impl Into<String>) -> Self {
        Self {
            definition,
            shell: shell.into(),
            working_dir: None,
            options: Mutex::new(None),
        }
    }

    /// Run commands from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn current_options(&self) -> Option<Options> {
        match self.options.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn is_transactional(&self) -> bool {
        self.definition.begin.is_some()
            || self.definition.finish.is_some()
            || self.definition.abort.is_some()
    }

    async fn run_command(
        &self,
        step: &str,
        command: &str,
        extra_env: &[(&str, String)],
    ) -> Result<(), MigrationError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .env("TIDEMARK_VERSION", &self.definition.id);

        if let Some(options) = self.current_options() {
            cmd.env("TIDEMARK_DIRECTION", options.direction.as_str())
                .env("TIDEMARK_FORCED", options.forced.to_string())
                .env("TIDEMARK_DRY_RUN", options.dry_run.to_string());
        }
        for (key, value) in extra_env {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        debug!(version = %self.definition.id, step, command, "Running command");
        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(MigrationError::Failed(format!(
                "{} command of {} exited with {}: {}",
                step, self.definition.id, output.status, stderr
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Migration for CommandMigration {
    fn id(&self) -> &str {
        &self.definition.id
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    async fn up(&self) -> Result<(), MigrationError> {
        self.run_command("up", &self.definition.up, &[]).await
    }

    async fn down(&self) -> Result<(), MigrationError> {
        self.run_command("down", &self.definition.down, &[]).await
    }

    fn as_transactional(&self) -> Option<&dyn Transactional> {
        if self.is_transactional() {
            Some(self)
        } else {
            None
        }
    }

    fn as_options_aware(&self) -> Option<&dyn OptionsAware> {
        Some(self)
    }
}

#[async_trait]
impl Transactional for CommandMigration {
    async fn begin(&self) -> Result<(), MigrationError> {
        match &self.definition.begin {
            Some(command) => self.run_command("begin", command, &[]).await,
            None => Ok(()),
        }
    }

    async fn finish(&self) -> Result<(), MigrationError> {
        match &self.definition.finish {
            Some(command) => self.run_command("finish", command, &[]).await,
            None => Ok(()),
        }
    }

    async fn abort(&self, error: &MigrationError) -> Result<(), MigrationError> {
        match &self.definition.abort {
            Some(command) => {
                self.run_command("abort", command, &[("TIDEMARK_ERROR", error.to_string())])
                    .await
            }
            None => Ok(()),
        }
    }
}

impl OptionsAware for CommandMigration {
    fn set_run_options(&self, options: &Options) {
        match self.options.lock() {
            Ok(mut guard) => *guard = Some(options.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(options.clone()),
        }
    }
}
