//! Logging for the ingress adapter.
//!
//! Events go to `ikontrol-ingress.log` in the XDG state dir. When that file
//! cannot be set up the CLI calls [`init_logging_stderr`] instead.

use anyhow::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,ikontrol=debug";
const LOG_FILE: &str = "ikontrol-ingress.log";

/// Destination of one formatted event: the adapter log, or stderr if the
/// log handle could not be duplicated for this event.
enum EventSink {
    Log(File),
    Stderr,
}

impl io::Write for EventSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EventSink::Log(f) => f.write(buf),
            EventSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EventSink::Log(f) => f.flush(),
            EventSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Hands each event a duplicate of the open adapter log handle.
struct AdapterLog(File);

impl<'a> MakeWriter<'a> for AdapterLog {
    type Writer = EventSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(file) => EventSink::Log(file),
            Err(_) => EventSink::Stderr,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/ikontrol-ingress/ikontrol-ingress.log`; creates the directory.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ikontrol-ingress")?;
    Ok(xdg_dirs.place_state_file(LOG_FILE)?)
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Send adapter logs to the state-dir log file.
/// Errors leave no subscriber installed, so the caller can still pick stderr.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = open_log(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(AdapterLog(file)))
        .with_ansi(false)
        .init();

    tracing::info!(log = %path.display(), "ikontrol-ingress logging started");
    Ok(())
}

/// Send adapter logs to stderr.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn adapter_log_appends_through_each_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join(LOG_FILE);
        let log = AdapterLog(open_log(&path).unwrap());

        log.make_writer().write_all(b"first\n").unwrap();
        let mut second = log.make_writer();
        second.write_all(b"second\n").unwrap();
        second.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn reopening_log_keeps_earlier_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);
        open_log(&path).unwrap().write_all(b"run 1\n").unwrap();
        open_log(&path).unwrap().write_all(b"run 2\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "run 1\nrun 2\n");
    }
}
