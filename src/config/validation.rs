use super::defaults::{MAX_COMMAND_GAP_MS, MAX_POLL_MS, MAX_TASK_PAUSE_MS, MIN_POLL_MS};
use super::AppConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the task path.
    pub fn validate(&mut self) -> Result<()> {
        if self.port == 0 {
            bail!("--port must be between 1 and 65535, got 0");
        }
        if self.command_gap_ms > MAX_COMMAND_GAP_MS {
            bail!(
                "--command-gap-ms must be between 0 and {MAX_COMMAND_GAP_MS} ms, got {}",
                self.command_gap_ms
            );
        }
        if !(MIN_POLL_MS..=MAX_POLL_MS).contains(&self.poll_ms) {
            bail!(
                "--poll-ms must be between {MIN_POLL_MS} and {MAX_POLL_MS} ms, got {}",
                self.poll_ms
            );
        }
        if self.task_pause_ms > MAX_TASK_PAUSE_MS {
            bail!(
                "--task-pause-ms must be between 0 and {MAX_TASK_PAUSE_MS} ms, got {}",
                self.task_pause_ms
            );
        }
        if self.ready_layout == 0 {
            bail!("--ready-layout must light at least one segment");
        }

        let metadata = fs::metadata(&self.tasks)
            .with_context(|| format!("task file {} not found", self.tasks.display()))?;
        if !metadata.is_file() {
            bail!("task file {} is not a regular file", self.tasks.display());
        }
        self.tasks = self
            .tasks
            .canonicalize()
            .with_context(|| format!("failed to resolve task file {}", self.tasks.display()))?;

        if let Some(path) = &self.event_log {
            if path.is_dir() {
                bail!("--event-log {} is a directory", path.display());
            }
        }
        if let Some(path) = &self.log_file {
            if path.is_dir() {
                bail!("--log-file {} is a directory", path.display());
            }
        }
        Ok(())
    }
}
