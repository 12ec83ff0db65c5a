//! Tracing setup: console output plus a size-rotated JSON log file
//!
//! The file layer writes one flattened JSON object per line (`timestamp`,
//! `level`, `message`, then the event's own fields such as `currentIP`).
//! Backups are named `<file>.1`, `<file>.2`, ... with `.1` the newest; when
//! compression is on every backup except `.1` is gzipped. Backups older than
//! the age limit are removed at startup and again each time the file rotates.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub path: PathBuf,
    pub max_size_mb: u64,
    pub max_backups: usize,
    /// 0 disables age-based expiry
    pub max_age_days: u64,
    pub compress: bool,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub console_json: bool,
}

/// Install the global subscriber
///
/// Expired backups are pruned first, so the prune count can be logged once
/// the subscriber is up.
pub fn init(options: &LogOptions) -> Result<()> {
    let pruned = prune_expired(&options.path, options.max_age_days, Utc::now())
        .with_context(|| format!("Failed to prune old logs next to {}", options.path.display()))?;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&options.level)
            .with_context(|| format!("Invalid log level '{}'", options.level))?,
    };

    let file_layer = fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_ansi(false)
        .with_writer(Mutex::new(PruningWriter::new(file_writer(options)?, options)));

    let console_json = options
        .console_json
        .then(|| fmt::layer().json().flatten_event(true).with_target(false));
    let console_text = (!options.console_json).then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_json)
        .with(console_text)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    if pruned > 0 {
        tracing::info!(pruned, "Removed expired log backups");
    }
    Ok(())
}

/// Open the rotating log file, creating its directory if needed
fn file_writer(options: &LogOptions) -> Result<FileRotate<AppendCount>> {
    if let Some(parent) = options.path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let compression = if options.compress {
        Compression::OnRotate(1)
    } else {
        Compression::None
    };

    Ok(FileRotate::new(
        &options.path,
        AppendCount::new(options.max_backups),
        ContentLimit::BytesSurpassed(bytes_limit(options.max_size_mb)),
        compression,
        #[cfg(unix)]
        None,
    ))
}

/// Rotating writer that expires old backups whenever a rotation is due
///
/// Counts bytes the same way the rotation limit does, so pruning runs right
/// after the inner writer starts a new file.
struct PruningWriter<W> {
    inner: W,
    path: PathBuf,
    max_age_days: u64,
    limit: usize,
    written: usize,
}

impl<W: Write> PruningWriter<W> {
    fn new(inner: W, options: &LogOptions) -> Self {
        Self::with_limit(inner, options, bytes_limit(options.max_size_mb))
    }

    fn with_limit(inner: W, options: &LogOptions, limit: usize) -> Self {
        Self {
            inner,
            path: options.path.clone(),
            max_age_days: options.max_age_days,
            limit,
            written: 0,
        }
    }

    fn after_write(&mut self, n: usize) {
        self.written = self.written.saturating_add(n);
        if self.written < self.limit {
            return;
        }
        self.written = 0;
        // The subscriber owns this writer, so failures cannot be traced here
        if let Err(e) = prune_expired(&self.path, self.max_age_days, Utc::now()) {
            eprintln!("Failed to prune old logs next to {}: {}", self.path.display(), e);
        }
    }
}

impl<W: Write> Write for PruningWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.after_write(n);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn bytes_limit(max_size_mb: u64) -> usize {
    usize::try_from(max_size_mb.saturating_mul(BYTES_PER_MB)).unwrap_or(usize::MAX)
}

/// Remove rotated backups of `log_path` last modified before `now - max_age_days`
///
/// Only siblings named `<file>.<suffix>` are considered; the active file is
/// never touched. Returns the number of files removed.
pub fn prune_expired(log_path: &Path, max_age_days: u64, now: DateTime<Utc>) -> io::Result<usize> {
    let Some(max_age) = i64::try_from(max_age_days)
        .ok()
        .filter(|days| *days > 0)
        .and_then(TimeDelta::try_days)
    else {
        return Ok(0);
    };
    let Some(cutoff) = now.checked_sub_signed(max_age) else {
        return Ok(0);
    };

    let Some(file_name) = log_path.file_name().and_then(|n| n.to_str()) else {
        return Ok(0);
    };
    let prefix = format!("{}.", file_name);
    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified: DateTime<Utc> = metadata.modified()?.into();
        if modified < cutoff {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    Ok(removed)
}
