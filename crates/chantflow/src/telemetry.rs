//! Logging setup: a stderr layer plus a per-dataset run log file.
//!
//! Run log lines look like `INFO 19-10-26 14:03:52 Extracted 05 contours
//! from 00042.volpiano`. The run log can be pointed at a new file between
//! datasets; events emitted while no file is open only reach stderr.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Timestamp format of run log lines.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%y %H:%M:%S";

/// Formats events as `<LEVEL> <timestamp> <message>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunLogFormat;

impl<S, N> FormatEvent<S, N> for RunLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} {} ",
            event.metadata().level(),
            Local::now().format(TIMESTAMP_FORMAT)
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// A log file that can be swapped while the subscriber is installed.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    file: Arc<Mutex<Option<File>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh log at `path`, truncating any existing file.
    pub fn open(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create run log {}", path.display()))?;
        *self.lock() = Some(file);
        Ok(())
    }

    pub fn close(&self) {
        if let Some(mut file) = self.lock().take() {
            let _ = file.flush();
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writer handed out per event by [`RunLog`].
pub struct RunLogWriter {
    file: Arc<Mutex<Option<File>>>,
}

impl io::Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RunLog {
    type Writer = RunLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RunLogWriter {
            file: Arc::clone(&self.file),
        }
    }
}

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber and return the run log handle.
pub fn init(level: &str) -> Result<RunLog> {
    let run_log = RunLog::new();

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(RunLogFormat)
                .with_ansi(false)
                .with_writer(run_log.clone()),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(run_log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_log_subscriber(run_log: &RunLog) -> impl Subscriber + Send + Sync + 'static {
        tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(RunLogFormat)
                .with_ansi(false)
                .with_writer(run_log.clone()),
        )
    }

    #[test]
    fn test_run_log_line_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let run_log = RunLog::new();
        run_log.open(&path).unwrap();

        tracing::subscriber::with_default(run_log_subscriber(&run_log), || {
            tracing::info!("Extracted {:0>2} contours from {}", 5, "00042.volpiano");
            tracing::warn!("Skipping 00043: chant contains no notes");
        });
        run_log.close();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let (level, rest) = lines[0].split_once(' ').unwrap();
        assert_eq!(level, "INFO");
        // dd-mm-yy HH:MM:SS
        let timestamp = &rest[..17];
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(&rest[18..], "Extracted 05 contours from 00042.volpiano");

        assert!(lines[1].starts_with("WARN "));
        assert!(lines[1].ends_with("Skipping 00043: chant contains no notes"));
    }

    #[test]
    fn test_events_without_open_log_are_dropped() {
        let run_log = RunLog::new();
        assert!(!run_log.is_open());
        tracing::subscriber::with_default(run_log_subscriber(&run_log), || {
            tracing::info!("nowhere to go");
        });
    }

    #[test]
    fn test_reopen_switches_files() {
        let dir = TempDir::new().unwrap();
        let (first, second) = (dir.path().join("a.log"), dir.path().join("b.log"));
        let run_log = RunLog::new();

        tracing::subscriber::with_default(run_log_subscriber(&run_log), || {
            run_log.open(&first).unwrap();
            tracing::info!("first dataset");
            run_log.open(&second).unwrap();
            tracing::info!("second dataset");
        });
        run_log.close();

        let a = std::fs::read_to_string(&first).unwrap();
        let b = std::fs::read_to_string(&second).unwrap();
        assert!(a.contains("first dataset") && !a.contains("second"));
        assert!(b.contains("second dataset"));
    }
}
