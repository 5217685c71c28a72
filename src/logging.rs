//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! The terminal belongs to the UI, so log output only ever goes to a file.
//! Without `--log-file` no subscriber is installed and every `tracing` macro
//! is a no-op.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter from `directive`, letting `RUST_LOG` override it.
pub fn build_env_filter(directive: &str) -> Result<EnvFilter> {
    filter_from(std::env::var("RUST_LOG").ok().as_deref(), directive)
}

/// A non-blank `env_override` wins over `directive`.
fn filter_from(env_override: Option<&str>, directive: &str) -> Result<EnvFilter> {
    match env_override {
        Some(env) if !env.trim().is_empty() => {
            EnvFilter::try_new(env).context("invalid RUST_LOG filter")
        }
        _ => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter {directive:?}")),
    }
}

/// Install the global subscriber, appending to `log_file` when given.
pub fn init(log_file: Option<&Path>, directive: &str) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let filter = build_env_filter(directive)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("failed to install log subscriber")?;

    tracing::info!(path = %path.display(), "logging initialised");
    Ok(())
}

/// In-memory log capture for tests.
#[cfg(test)]
pub mod testing {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Route this thread's events (debug and up) into a buffer until the
    /// guard drops.
    pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_is_used_without_override() {
        assert!(filter_from(None, "debug").is_ok());
        assert!(build_env_filter("debug").is_ok());
    }

    #[test]
    fn blank_override_falls_back_to_directive() {
        let filter = filter_from(Some("   "), "gist_hooks=trace").unwrap();
        assert!(filter.to_string().contains("gist_hooks=trace"));
    }

    #[test]
    fn override_wins_over_directive() {
        let filter = filter_from(Some("warn"), "x=notalevel").unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn bad_directive_names_itself_in_the_error() {
        let err = filter_from(None, "x=notalevel").unwrap_err();
        assert_eq!(err.to_string(), r#"invalid log filter "x=notalevel""#);
    }

    #[test]
    fn bad_override_is_reported_as_rust_log() {
        let err = filter_from(Some("x=notalevel"), "info").unwrap_err();
        assert_eq!(err.to_string(), "invalid RUST_LOG filter");
    }

    #[test]
    fn no_log_file_means_no_subscriber() {
        assert!(init(None, "info").is_ok());
    }

    #[test]
    fn log_file_is_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gist-hooks.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        init(Some(&path), "info").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("earlier run\n"), "appends, not truncates");
        assert!(contents.contains("logging initialised"));
    }

    #[test]
    fn unopenable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("gist-hooks.log");

        let err = init(Some(&path), "info").unwrap_err();
        assert!(err.to_string().starts_with("failed to open log file"));
    }
}
