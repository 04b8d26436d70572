use crate::config::AppConfig;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::sync::{Mutex, OnceLock};
use tracing::Subscriber;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once: compact text on stderr, or JSON lines
/// when `--log-file` is set.
pub fn init_tracing(config: &AppConfig) -> Result<()> {
    if TRACING_INIT.get().is_some() {
        return Ok(());
    }
    let level = config.log_level.as_tracing();

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let subscriber = tracing_subscriber::fmt()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .with_max_level(level)
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false)
                .finish();
            install(subscriber);
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .compact()
                .with_max_level(level)
                .with_target(false)
                .with_writer(io::stderr)
                .finish();
            install(subscriber);
        }
    }
    Ok(())
}

fn install<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    let _ = TRACING_INIT.get_or_init(|| {
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::env;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn json_log_file_receives_events() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = env::temp_dir().join(format!("pickbylight_trace_{nanos}.jsonl"));
        let config = AppConfig::parse_from([
            "test-app".to_string(),
            "tasks.json".to_string(),
            "--log-file".to_string(),
            path.display().to_string(),
            "--log-level".to_string(),
            "debug".to_string(),
        ]);
        init_tracing(&config).expect("init tracing");
        // second call is a no-op
        init_tracing(&config).expect("init tracing again");

        tracing::info!(task_id = 42, "telemetry probe");
        let text = fs::read_to_string(&path).expect("read log file");
        let line = text
            .lines()
            .find(|line| line.contains("telemetry probe"))
            .expect("probe line written");
        let value: serde_json::Value = serde_json::from_str(line).expect("json line");
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["fields"]["task_id"], 42);
        assert!(value["timestamp"].as_str().is_some_and(|ts| ts.ends_with('Z')));
        let _ = fs::remove_file(path);
    }
}
